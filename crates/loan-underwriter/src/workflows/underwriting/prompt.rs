use super::application::ApplicationRecord;

const TASK_FRAMING: &str = "\
You are an underwriting system responsible for two tasks:
1. Validate the provided loan policy document for completeness and logical consistency.
2. Apply the policy to the applicant data to reach a decision.";

const OUTPUT_SCHEMA: &str = r#"Return output that exactly matches this JSON schema:

{
  "decision": "approved" | "denied",
  "reasoning": "string (detailed explanation; include validation or underwriting reasoning)",
  "riskLevel": "low" | "medium" | "high"
}"#;

const VALIDATION_RULES: &[&str] = &[
    "Credit score tiers must be numeric and non-overlapping (for example 650-719, 720+).",
    "Every tier must define a debt-to-income (DTI) limit expressed as a positive percentage.",
    "Minimum annual income and minimum employment months must be clearly defined and positive.",
    "If any of the above is missing, contradictory, or non-numeric, set \"decision\" to \"denied\" and explain the policy problem in \"reasoning\".",
    "If the policy is malformed or inconsistent, do not attempt underwriting; report only the validation issue.",
];

const UNDERWRITING_RULES: &[&str] = &[
    "Use only lowercase values for \"decision\" and \"riskLevel\".",
    "\"riskLevel\" must be exactly one of \"low\", \"medium\", or \"high\", never a phrase such as \"low risk\".",
    "Follow the provided policy and calculate the applicant's DTI.",
    "If the applicant violates any rule, explain which rule and why in \"reasoning\".",
    "Never wrap the answer in markdown or code fences.",
    "Never add prose before or after the JSON object and do not restate these instructions.",
];

const CLOSING_STEPS: &str = "\
Now perform:
1. Validate the policy structure and logic.
2. If the policy is valid, apply the underwriting rules.
3. Output ONLY the final JSON object described by the schema above.";

/// Composes the single instruction sent to the completion oracle. The policy
/// text is embedded verbatim and the record as indented JSON.
pub fn build_prompt(policy_text: &str, record: &ApplicationRecord) -> String {
    let mut prompt = String::new();

    prompt.push_str(TASK_FRAMING);
    prompt.push_str("\n\n");
    prompt.push_str(OUTPUT_SCHEMA);

    prompt.push_str("\n\n### VALIDATION RULES\n");
    prompt.push_str("Before making a decision, check that the policy text is internally consistent and usable:\n");
    push_bullets(&mut prompt, VALIDATION_RULES);

    prompt.push_str("\n### UNDERWRITING RULES\n");
    push_bullets(&mut prompt, UNDERWRITING_RULES);

    prompt.push_str("\nPolicy text:\n");
    prompt.push_str(policy_text);

    prompt.push_str("\n\nLoan application JSON:\n");
    prompt.push_str(&render_record(record));

    prompt.push_str("\n\n");
    prompt.push_str(CLOSING_STEPS);
    prompt.push('\n');

    prompt
}

fn push_bullets(prompt: &mut String, rules: &[&str]) {
    for rule in rules {
        prompt.push_str("- ");
        prompt.push_str(rule);
        prompt.push('\n');
    }
}

// Plain scalar fields; serialization does not fail in practice.
fn render_record(record: &ApplicationRecord) -> String {
    serde_json::to_string_pretty(record).unwrap_or_else(|_| format!("{record:?}"))
}
