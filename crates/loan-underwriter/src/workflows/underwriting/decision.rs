use serde::{Deserialize, Serialize};

/// Reasoning attached to the fallback decision.
pub const FALLBACK_REASONING: &str = "could not parse model output";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Approved,
    Denied,
}

impl Decision {
    /// Accepts an already lower-cased value.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "approved" => Some(Self::Approved),
            "denied" => Some(Self::Denied),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Decision::Approved => "approved",
            Decision::Denied => "denied",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Accepts an already lower-cased value.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

/// Underwriting result rendered to the console.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionOutput {
    pub decision: Decision,
    pub reasoning: String,
    pub risk_level: RiskLevel,
}

impl DecisionOutput {
    /// Denied at high risk, used whenever a reply cannot be trusted.
    pub fn fallback() -> Self {
        Self {
            decision: Decision::Denied,
            reasoning: FALLBACK_REASONING.to_string(),
            risk_level: RiskLevel::High,
        }
    }

    pub fn is_fallback(&self) -> bool {
        *self == Self::fallback()
    }
}
