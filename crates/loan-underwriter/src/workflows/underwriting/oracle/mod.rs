pub mod gemini;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

/// Remote text-completion service that validates the policy and underwrites
/// the application in a single call.
#[async_trait]
pub trait CompletionOracle: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<OracleReply, OracleError>;
}

#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("completion request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("completion service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
}

/// Reply payload in whichever shape the service produced.
#[derive(Debug, Clone, PartialEq)]
pub enum OracleReply {
    /// A top-level `text` field.
    PlainText(String),
    /// Text fragments per candidate, in order.
    Candidates(Vec<Vec<String>>),
    /// Anything else; coerced to text as-is.
    Unrecognized(Value),
}

#[derive(Debug, Deserialize)]
struct CandidateEnvelope {
    #[serde(default)]
    candidates: Vec<WireCandidate>,
}

#[derive(Debug, Deserialize)]
struct WireCandidate {
    #[serde(default)]
    content: Option<WireContent>,
}

#[derive(Debug, Deserialize)]
struct WireContent {
    #[serde(default)]
    parts: Vec<WirePart>,
}

#[derive(Debug, Deserialize)]
struct WirePart {
    #[serde(default)]
    text: Option<String>,
}

impl OracleReply {
    /// Classifies a decoded response body. A non-empty `text` field wins over
    /// candidates.
    pub fn from_value(value: Value) -> Self {
        if let Some(text) = value
            .get("text")
            .and_then(Value::as_str)
            .filter(|text| !text.trim().is_empty())
        {
            return Self::PlainText(text.to_string());
        }

        match serde_json::from_value::<CandidateEnvelope>(value.clone()) {
            Ok(envelope) if !envelope.candidates.is_empty() => Self::Candidates(
                envelope
                    .candidates
                    .into_iter()
                    .map(|candidate| {
                        candidate
                            .content
                            .map(|content| {
                                content.parts.into_iter().filter_map(|part| part.text).collect()
                            })
                            .unwrap_or_default()
                    })
                    .collect(),
            ),
            _ => Self::Unrecognized(value),
        }
    }

    /// Classifies a raw response body; bodies that are not JSON are kept as
    /// plain text.
    pub fn from_body(body: &str) -> Self {
        match serde_json::from_str::<Value>(body) {
            Ok(value) => Self::from_value(value),
            Err(_) => Self::Unrecognized(Value::String(body.to_string())),
        }
    }

    pub fn into_text(self) -> String {
        match self {
            OracleReply::PlainText(text) => text.trim().to_string(),
            OracleReply::Candidates(candidates) => candidates.concat().concat(),
            OracleReply::Unrecognized(Value::String(text)) => text,
            OracleReply::Unrecognized(other) => other.to_string(),
        }
    }
}
