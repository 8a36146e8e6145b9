use serde::{Deserialize, Serialize};

/// Credit-score band carrying its own risk label and DTI ceiling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditTier {
    #[serde(default)]
    pub min: Option<i64>,
    #[serde(default)]
    pub max: Option<i64>,
    pub risk: String,
    #[serde(default)]
    pub max_dti: Option<f64>,
    #[serde(default)]
    pub special_income_min: Option<i64>,
}

impl CreditTier {
    fn lower_bound(&self) -> i64 {
        self.min.unwrap_or(i64::MIN)
    }

    fn upper_bound(&self) -> i64 {
        self.max.unwrap_or(i64::MAX)
    }
}

/// Structured form of a lending policy. The oracle still receives the raw
/// policy text; this model only backs local structural checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicySpecification {
    pub credit_tiers: Vec<CreditTier>,
    pub income_min_annual: i64,
    pub employment_min_months: i64,
    pub employment_min_months_self_employed: i64,
    pub first_time_buyer_dti_add: f64,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PolicyIssue {
    #[error("policy defines no credit tiers")]
    NoCreditTiers,
    #[error("tier '{risk}' has min {min} above max {max}")]
    InvertedTier { risk: String, min: i64, max: i64 },
    #[error("tiers '{first}' and '{second}' overlap")]
    OverlappingTiers { first: String, second: String },
    #[error("tier '{risk}' has no positive DTI limit")]
    MissingDtiLimit { risk: String },
    #[error("{field} must be positive (found {value})")]
    NonPositiveMinimum { field: &'static str, value: i64 },
    #[error("first_time_buyer_dti_add must not be negative (found {0})")]
    NegativeDtiAllowance(f64),
}

impl PolicySpecification {
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Structural problems in the policy, empty when usable.
    pub fn validate(&self) -> Vec<PolicyIssue> {
        let mut issues = Vec::new();

        if self.credit_tiers.is_empty() {
            issues.push(PolicyIssue::NoCreditTiers);
        }

        for tier in &self.credit_tiers {
            if let (Some(min), Some(max)) = (tier.min, tier.max) {
                if min > max {
                    issues.push(PolicyIssue::InvertedTier {
                        risk: tier.risk.clone(),
                        min,
                        max,
                    });
                }
            }

            if !tier.max_dti.is_some_and(|dti| dti.is_finite() && dti > 0.0) {
                issues.push(PolicyIssue::MissingDtiLimit {
                    risk: tier.risk.clone(),
                });
            }
        }

        let mut ordered: Vec<&CreditTier> = self.credit_tiers.iter().collect();
        ordered.sort_by_key(|tier| tier.lower_bound());
        for pair in ordered.windows(2) {
            if pair[1].lower_bound() <= pair[0].upper_bound() {
                issues.push(PolicyIssue::OverlappingTiers {
                    first: pair[0].risk.clone(),
                    second: pair[1].risk.clone(),
                });
            }
        }

        for (field, value) in [
            ("income_min_annual", self.income_min_annual),
            ("employment_min_months", self.employment_min_months),
            (
                "employment_min_months_self_employed",
                self.employment_min_months_self_employed,
            ),
        ] {
            if value <= 0 {
                issues.push(PolicyIssue::NonPositiveMinimum { field, value });
            }
        }

        if self.first_time_buyer_dti_add < 0.0 {
            issues.push(PolicyIssue::NegativeDtiAllowance(
                self.first_time_buyer_dti_add,
            ));
        }

        issues
    }

    /// Tier whose score band contains `credit_score`.
    pub fn tier_for(&self, credit_score: i64) -> Option<&CreditTier> {
        self.credit_tiers
            .iter()
            .find(|tier| tier.lower_bound() <= credit_score && credit_score <= tier.upper_bound())
    }
}
