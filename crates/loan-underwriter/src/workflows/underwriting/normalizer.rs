use serde_json::{Map, Value};
use tracing::warn;

use super::decision::{Decision, DecisionOutput, RiskLevel};

const FENCE: &str = "```";
const FENCE_LANGUAGE_TAG: &str = "json";

#[derive(Debug, thiserror::Error)]
pub enum ReplyParseError {
    #[error("reply is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("reply JSON is not an object")]
    NotAnObject,
    #[error("field '{field}' must be a string")]
    NonStringField { field: &'static str },
    #[error("decision '{0}' is not one of approved/denied")]
    UnknownDecision(String),
    #[error("risk level '{0}' is not one of low/medium/high")]
    UnknownRiskLevel(String),
}

/// Turns a raw oracle reply into a decision, never failing outward. Replies
/// that cannot be parsed are logged and replaced by
/// [`DecisionOutput::fallback`].
pub fn normalize_reply(raw: &str) -> DecisionOutput {
    let body = strip_fences(raw);
    match parse_body(body) {
        Ok(output) => output,
        Err(error) => {
            warn!(%error, reply = %body, "could not parse oracle reply, using fallback decision");
            DecisionOutput::fallback()
        }
    }
}

/// Fallible core of [`normalize_reply`].
pub fn parse_reply(raw: &str) -> Result<DecisionOutput, ReplyParseError> {
    parse_body(strip_fences(raw))
}

/// Removes one leading fence (optionally tagged `json`) and one trailing
/// fence from the trimmed text. Interior fences are kept.
pub fn strip_fences(raw: &str) -> &str {
    let mut text = raw.trim();
    if let Some(rest) = text.strip_prefix(FENCE) {
        text = rest.strip_prefix(FENCE_LANGUAGE_TAG).unwrap_or(rest);
    }

    let text = text.trim();
    text.strip_suffix(FENCE).unwrap_or(text).trim_end()
}

fn parse_body(body: &str) -> Result<DecisionOutput, ReplyParseError> {
    let Value::Object(fields) = serde_json::from_str::<Value>(body)? else {
        return Err(ReplyParseError::NotAnObject);
    };
    let fields = lowercase_keys(fields);

    let decision = string_field(&fields, "decision")?.to_lowercase();
    let risk_level = string_field(&fields, "risklevel")?.to_lowercase();
    let reasoning = string_field(&fields, "reasoning")?.to_string();

    Ok(DecisionOutput {
        decision: Decision::parse(&decision).ok_or(ReplyParseError::UnknownDecision(decision))?,
        reasoning,
        risk_level: RiskLevel::parse(&risk_level)
            .ok_or(ReplyParseError::UnknownRiskLevel(risk_level))?,
    })
}

// Keys are visited in document order, so the later of two keys that differ
// only by case wins.
fn lowercase_keys(fields: Map<String, Value>) -> Map<String, Value> {
    fields
        .into_iter()
        .map(|(key, value)| (key.to_lowercase(), value))
        .collect()
}

fn string_field<'a>(
    fields: &'a Map<String, Value>,
    field: &'static str,
) -> Result<&'a str, ReplyParseError> {
    match fields.get(field) {
        None => Ok(""),
        Some(Value::String(value)) => Ok(value),
        Some(_) => Err(ReplyParseError::NonStringField { field }),
    }
}
