use std::fmt;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Applicant facts submitted for underwriting. Field names serialize in the
/// camelCase form used by application files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationRecord {
    pub applicant_id: String,
    pub requested_amount: i64,
    pub annual_income: f64,
    pub monthly_debt: f64,
    pub credit_score: i64,
    pub employment_months: i64,
    pub is_first_time_buyer: bool,
    pub is_self_employed: bool,
}

/// Label used when the document itself, rather than a field, is at fault.
pub const ROOT_FIELD: &str = "(root)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpectedType {
    String,
    Integer,
    Decimal,
    Boolean,
    Object,
}

impl ExpectedType {
    fn describe(self) -> &'static str {
        match self {
            ExpectedType::String => "a valid string",
            ExpectedType::Integer => "a valid integer",
            ExpectedType::Decimal => "a valid finite number",
            ExpectedType::Boolean => "a valid boolean",
            ExpectedType::Object => "a JSON object",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueKind {
    Missing,
    InvalidType { expected: ExpectedType },
}

/// One offending field in an application document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    pub field: &'static str,
    pub kind: IssueKind,
}

impl FieldIssue {
    pub fn message(&self) -> String {
        match &self.kind {
            IssueKind::Missing => "Field required".to_string(),
            IssueKind::InvalidType { expected } => {
                format!("Input should be {}", expected.describe())
            }
        }
    }
}

/// Every field that failed validation, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    issues: Vec<FieldIssue>,
}

impl ValidationError {
    pub fn issues(&self) -> &[FieldIssue] {
        &self.issues
    }

    pub fn fields(&self) -> Vec<&'static str> {
        self.issues.iter().map(|issue| issue.field).collect()
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = self
            .issues
            .iter()
            .map(|issue| format!("{}: {}", issue.field, issue.message()))
            .collect::<Vec<_>>()
            .join("; ");
        write!(
            f,
            "{} invalid application field(s): {}",
            self.issues.len(),
            rendered
        )
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, thiserror::Error)]
pub enum ApplicationLoadError {
    #[error("failed to read application file: {0}")]
    Io(#[from] std::io::Error),
    #[error("application file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Invalid(#[from] ValidationError),
}

impl ApplicationRecord {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ApplicationLoadError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ApplicationLoadError> {
        let value: Value = serde_json::from_reader(reader)?;
        Ok(Self::from_value(&value)?)
    }

    /// Builds a record from an arbitrary JSON value, coercing loosely typed
    /// inputs (numeric strings, `"yes"`, `200000.0`) and reporting every
    /// offending field at once. Unknown keys are ignored.
    pub fn from_value(value: &Value) -> Result<Self, ValidationError> {
        let Some(fields) = value.as_object() else {
            return Err(ValidationError {
                issues: vec![FieldIssue {
                    field: ROOT_FIELD,
                    kind: IssueKind::InvalidType {
                        expected: ExpectedType::Object,
                    },
                }],
            });
        };

        let mut reader = FieldReader::new(fields);
        let applicant_id = reader.read("applicantId", ExpectedType::String, coerce_string);
        let requested_amount =
            reader.read("requestedAmount", ExpectedType::Integer, coerce_integer);
        let annual_income = reader.read("annualIncome", ExpectedType::Decimal, coerce_decimal);
        let monthly_debt = reader.read("monthlyDebt", ExpectedType::Decimal, coerce_decimal);
        let credit_score = reader.read("creditScore", ExpectedType::Integer, coerce_integer);
        let employment_months =
            reader.read("employmentMonths", ExpectedType::Integer, coerce_integer);
        let is_first_time_buyer =
            reader.read("isFirstTimeBuyer", ExpectedType::Boolean, coerce_boolean);
        let is_self_employed =
            reader.read("isSelfEmployed", ExpectedType::Boolean, coerce_boolean);

        match (
            applicant_id,
            requested_amount,
            annual_income,
            monthly_debt,
            credit_score,
            employment_months,
            is_first_time_buyer,
            is_self_employed,
        ) {
            (
                Some(applicant_id),
                Some(requested_amount),
                Some(annual_income),
                Some(monthly_debt),
                Some(credit_score),
                Some(employment_months),
                Some(is_first_time_buyer),
                Some(is_self_employed),
            ) if reader.issues.is_empty() => Ok(Self {
                applicant_id,
                requested_amount,
                annual_income,
                monthly_debt,
                credit_score,
                employment_months,
                is_first_time_buyer,
                is_self_employed,
            }),
            _ => Err(ValidationError {
                issues: reader.issues,
            }),
        }
    }

    /// Debt-to-income ratio on a monthly basis, or `None` without income.
    pub fn debt_to_income(&self) -> Option<f64> {
        let monthly_income = self.annual_income / 12.0;
        if monthly_income > 0.0 {
            Some(self.monthly_debt / monthly_income)
        } else {
            None
        }
    }
}

struct FieldReader<'a> {
    fields: &'a Map<String, Value>,
    issues: Vec<FieldIssue>,
}

impl<'a> FieldReader<'a> {
    fn new(fields: &'a Map<String, Value>) -> Self {
        Self {
            fields,
            issues: Vec::new(),
        }
    }

    fn read<T>(
        &mut self,
        field: &'static str,
        expected: ExpectedType,
        coerce: fn(&Value) -> Option<T>,
    ) -> Option<T> {
        let Some(raw) = self.fields.get(field) else {
            self.issues.push(FieldIssue {
                field,
                kind: IssueKind::Missing,
            });
            return None;
        };

        let coerced = coerce(raw);
        if coerced.is_none() {
            self.issues.push(FieldIssue {
                field,
                kind: IssueKind::InvalidType { expected },
            });
        }
        coerced
    }
}

fn coerce_string(value: &Value) -> Option<String> {
    value.as_str().map(str::to_string)
}

fn coerce_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64().or_else(|| {
            number
                .as_f64()
                .filter(|float| float.is_finite() && float.fract() == 0.0)
                .filter(|float| *float >= i64::MIN as f64 && *float < i64::MAX as f64)
                .map(|float| float as i64)
        }),
        Value::String(raw) => raw.trim().parse::<i64>().ok(),
        _ => None,
    }
}

fn coerce_decimal(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(raw) => raw.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|float| float.is_finite())
}

fn coerce_boolean(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(flag) => Some(*flag),
        Value::Number(number) => match number.as_i64() {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => None,
        },
        Value::String(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "t" | "yes" | "y" | "on" | "1" => Some(true),
            "false" | "f" | "no" | "n" | "off" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_application() -> Value {
        json!({
            "applicantId": "A-1001",
            "requestedAmount": 200000,
            "annualIncome": 90000.0,
            "monthlyDebt": 1500.0,
            "creditScore": 750,
            "employmentMonths": 36,
            "isFirstTimeBuyer": false,
            "isSelfEmployed": false
        })
    }

    #[test]
    fn builds_record_from_complete_document() {
        let record = ApplicationRecord::from_value(&valid_application()).expect("valid record");
        assert_eq!(record.applicant_id, "A-1001");
        assert_eq!(record.requested_amount, 200_000);
        assert_eq!(record.annual_income, 90_000.0);
        assert_eq!(record.monthly_debt, 1_500.0);
        assert_eq!(record.credit_score, 750);
        assert_eq!(record.employment_months, 36);
        assert!(!record.is_first_time_buyer);
        assert!(!record.is_self_employed);
    }

    #[test]
    fn serialization_round_trips_every_field() {
        let record = ApplicationRecord::from_value(&valid_application()).expect("valid record");
        let serialized = serde_json::to_value(&record).expect("serializes");
        assert_eq!(serialized, valid_application());

        let reparsed = ApplicationRecord::from_value(&serialized).expect("reparses");
        assert_eq!(reparsed, record);
    }

    #[test]
    fn reports_each_missing_field_by_name() {
        let mut document = valid_application();
        let fields = document.as_object_mut().expect("object");
        fields.remove("creditScore");
        fields.remove("isSelfEmployed");

        let error = ApplicationRecord::from_value(&document).expect_err("fields missing");
        assert_eq!(error.fields(), vec!["creditScore", "isSelfEmployed"]);
        assert!(error
            .issues()
            .iter()
            .all(|issue| issue.kind == IssueKind::Missing));
        assert_eq!(error.issues()[0].message(), "Field required");
    }

    #[test]
    fn reports_wrong_types_separately_from_missing_fields() {
        let mut document = valid_application();
        let fields = document.as_object_mut().expect("object");
        fields.insert("annualIncome".to_string(), json!("plenty"));
        fields.insert("applicantId".to_string(), json!(1001));
        fields.remove("monthlyDebt");

        let error = ApplicationRecord::from_value(&document).expect_err("invalid fields");
        assert_eq!(
            error.issues(),
            &[
                FieldIssue {
                    field: "applicantId",
                    kind: IssueKind::InvalidType {
                        expected: ExpectedType::String
                    },
                },
                FieldIssue {
                    field: "annualIncome",
                    kind: IssueKind::InvalidType {
                        expected: ExpectedType::Decimal
                    },
                },
                FieldIssue {
                    field: "monthlyDebt",
                    kind: IssueKind::Missing,
                },
            ]
        );
        assert_eq!(error.issues()[0].message(), "Input should be a valid string");
    }

    #[test]
    fn coerces_loosely_typed_values() {
        let document = json!({
            "applicantId": "A-2002",
            "requestedAmount": "150000",
            "annualIncome": 72000,
            "monthlyDebt": "980.50",
            "creditScore": 701.0,
            "employmentMonths": " 18 ",
            "isFirstTimeBuyer": "yes",
            "isSelfEmployed": 0
        });

        let record = ApplicationRecord::from_value(&document).expect("coercible record");
        assert_eq!(record.requested_amount, 150_000);
        assert_eq!(record.annual_income, 72_000.0);
        assert_eq!(record.monthly_debt, 980.5);
        assert_eq!(record.credit_score, 701);
        assert_eq!(record.employment_months, 18);
        assert!(record.is_first_time_buyer);
        assert!(!record.is_self_employed);
    }

    #[test]
    fn rejects_fractional_integers_and_ambiguous_booleans() {
        let mut document = valid_application();
        let fields = document.as_object_mut().expect("object");
        fields.insert("creditScore".to_string(), json!(700.5));
        fields.insert("isFirstTimeBuyer".to_string(), json!(2));
        fields.insert("monthlyDebt".to_string(), json!(null));

        let error = ApplicationRecord::from_value(&document).expect_err("invalid fields");
        assert_eq!(
            error.fields(),
            vec!["monthlyDebt", "creditScore", "isFirstTimeBuyer"]
        );
    }

    #[test]
    fn integers_beyond_the_signed_range_are_rejected() {
        let mut document = valid_application();
        let fields = document.as_object_mut().expect("object");
        fields.insert("requestedAmount".to_string(), json!(9_223_372_036_854_775_808u64));
        fields.insert("creditScore".to_string(), json!(9.3e18));

        let error = ApplicationRecord::from_value(&document).expect_err("out of range");
        assert_eq!(error.fields(), vec!["requestedAmount", "creditScore"]);

        let mut document = valid_application();
        document["requestedAmount"] = json!(i64::MAX);
        let record = ApplicationRecord::from_value(&document).expect("largest integer fits");
        assert_eq!(record.requested_amount, i64::MAX);
    }

    #[test]
    fn non_object_document_is_reported_against_the_root() {
        let error = ApplicationRecord::from_value(&json!([1, 2, 3])).expect_err("not an object");
        assert_eq!(error.fields(), vec![ROOT_FIELD]);
        assert_eq!(error.issues()[0].message(), "Input should be a JSON object");
    }

    #[test]
    fn extra_keys_are_ignored() {
        let mut document = valid_application();
        document
            .as_object_mut()
            .expect("object")
            .insert("notes".to_string(), json!("referred by branch"));
        assert!(ApplicationRecord::from_value(&document).is_ok());
    }

    #[test]
    fn reader_distinguishes_syntax_errors_from_validation_errors() {
        let syntax = ApplicationRecord::from_reader("{ not json".as_bytes());
        assert!(matches!(syntax, Err(ApplicationLoadError::Json(_))));

        let invalid = ApplicationRecord::from_reader(r#"{"applicantId": "A-1"}"#.as_bytes());
        match invalid {
            Err(ApplicationLoadError::Invalid(error)) => assert_eq!(error.issues().len(), 7),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn debt_to_income_uses_monthly_income() {
        let record = ApplicationRecord::from_value(&valid_application()).expect("valid record");
        let ratio = record.debt_to_income().expect("income present");
        assert!((ratio - 0.2).abs() < 1e-9);
    }
}
