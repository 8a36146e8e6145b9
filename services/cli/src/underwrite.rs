use clap::Args;
use loan_underwriter::config::AppConfig;
use loan_underwriter::error::AppError;
use loan_underwriter::telemetry;
use loan_underwriter::workflows::underwriting::{
    ApplicationLoadError, ApplicationRecord, GeminiOracle, PolicyDocument, UnderwritingAgent,
    ValidationError,
};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

#[derive(Args, Debug)]
pub(crate) struct UnderwriteArgs {
    /// Path to the loan policy document (PDF, JSON, or plain text)
    #[arg(long)]
    pub(crate) policy: PathBuf,
    /// Path to the loan application JSON file
    #[arg(long)]
    pub(crate) app: PathBuf,
}

pub(crate) async fn run_underwrite(args: UnderwriteArgs) -> Result<(), AppError> {
    let UnderwriteArgs { policy, app } = args;

    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let policy = PolicyDocument::load(&policy)?;
    info!(format = ?policy.format, pages = policy.page_count, "policy document loaded");

    let record = match ApplicationRecord::from_path(&app) {
        Ok(record) => record,
        Err(ApplicationLoadError::Invalid(error)) => {
            print!("{}", render_validation_failure(&error));
            return Ok(());
        }
        Err(other) => return Err(other.into()),
    };

    println!("{}", render_block("Loan application input:", &record)?);

    let oracle = GeminiOracle::new(config.oracle.gemini_config()?)?;
    let agent = UnderwritingAgent::new(oracle);
    info!(model = %agent.oracle().config().model, "running underwriting agent");
    let output = agent.underwrite(&policy.text, &record).await?;

    println!("{}", render_block("Underwriting decision:", &output)?);

    Ok(())
}

fn render_validation_failure(error: &ValidationError) -> String {
    let mut rendered = String::from("\nValidation error in loan application JSON:\n\n");
    for issue in error.issues() {
        rendered.push_str(&format!(
            "  - Field '{}': {}\n",
            issue.field,
            issue.message()
        ));
    }
    rendered.push_str("\nPlease ensure all required fields are present and valid.\n");
    rendered
}

fn render_block<T: Serialize>(label: &str, value: &T) -> Result<String, serde_json::Error> {
    Ok(format!("\n{label}\n{}", serde_json::to_string_pretty(value)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use loan_underwriter::workflows::underwriting::{Decision, DecisionOutput, RiskLevel};
    use serde_json::json;

    #[test]
    fn validation_failure_lists_each_field() {
        let error = ApplicationRecord::from_value(&json!({
            "applicantId": "A-1",
            "requestedAmount": "lots",
            "annualIncome": 50000,
            "monthlyDebt": 400,
            "employmentMonths": 12,
            "isFirstTimeBuyer": true,
            "isSelfEmployed": false
        }))
        .expect_err("invalid application");

        let rendered = render_validation_failure(&error);
        assert!(rendered.contains("  - Field 'requestedAmount': Input should be a valid integer\n"));
        assert!(rendered.contains("  - Field 'creditScore': Field required\n"));
        assert!(rendered.ends_with("Please ensure all required fields are present and valid.\n"));
    }

    #[test]
    fn application_block_keeps_field_order() {
        let record = ApplicationRecord::from_value(&json!({
            "isSelfEmployed": false,
            "isFirstTimeBuyer": true,
            "employmentMonths": 36,
            "creditScore": 750,
            "monthlyDebt": 1500,
            "annualIncome": 90000,
            "requestedAmount": 200000,
            "applicantId": "A-1"
        }))
        .expect("valid application");

        let rendered = render_block("Loan application input:", &record).expect("renders");
        let keys: Vec<&str> = rendered
            .lines()
            .filter_map(|line| line.trim().strip_prefix('"'))
            .filter_map(|line| line.split('"').next())
            .collect();
        assert_eq!(
            keys,
            vec![
                "applicantId",
                "requestedAmount",
                "annualIncome",
                "monthlyDebt",
                "creditScore",
                "employmentMonths",
                "isFirstTimeBuyer",
                "isSelfEmployed",
            ]
        );
        assert!(rendered.contains("\"annualIncome\": 90000.0"));
    }

    #[test]
    fn decision_block_is_indented_json_after_label() {
        let output = DecisionOutput {
            decision: Decision::Denied,
            reasoning: "DTI above tier limit".to_string(),
            risk_level: RiskLevel::High,
        };
        let rendered = render_block("Underwriting decision:", &output).expect("renders");

        assert_eq!(
            rendered,
            "\nUnderwriting decision:\n{\n  \"decision\": \"denied\",\n  \"reasoning\": \"DTI above tier limit\",\n  \"riskLevel\": \"high\"\n}"
        );
    }
}
