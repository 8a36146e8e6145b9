pub mod application;
pub mod decision;
pub mod normalizer;
pub mod oracle;
pub mod policy;
pub mod prompt;

pub use application::{
    ApplicationLoadError, ApplicationRecord, ExpectedType, FieldIssue, IssueKind, ValidationError,
};
pub use decision::{Decision, DecisionOutput, RiskLevel};
pub use normalizer::{normalize_reply, parse_reply, ReplyParseError};
pub use oracle::gemini::{GeminiConfig, GeminiOracle};
pub use oracle::{CompletionOracle, OracleError, OracleReply};
pub use policy::{PolicyDocument, PolicyFormat, PolicySourceError, PolicySpecification};
pub use prompt::build_prompt;

use tracing::{debug, info};

/// Runs one underwriting pass: prompt, oracle call, reply normalization.
pub struct UnderwritingAgent<O> {
    oracle: O,
}

impl<O> UnderwritingAgent<O>
where
    O: CompletionOracle,
{
    pub fn new(oracle: O) -> Self {
        Self { oracle }
    }

    /// Transport failures propagate; an unusable reply becomes the fallback
    /// decision.
    pub async fn underwrite(
        &self,
        policy_text: &str,
        record: &ApplicationRecord,
    ) -> Result<DecisionOutput, OracleError> {
        debug!(
            applicant_id = %record.applicant_id,
            credit_score = record.credit_score,
            debt_to_income = ?record.debt_to_income(),
            "building underwriting prompt"
        );
        let prompt = build_prompt(policy_text, record);

        let reply = self.oracle.complete(&prompt).await?;
        let output = normalize_reply(&reply.into_text());

        info!(
            applicant_id = %record.applicant_id,
            decision = output.decision.as_str(),
            risk_level = output.risk_level.as_str(),
            "underwriting decision ready"
        );
        Ok(output)
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }
}
