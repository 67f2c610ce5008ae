//! Document validation: status taxonomy, rules, and the rule orchestrator.

pub mod rules;
mod validator;

pub use rules::{DateRangeRule, HeaderLengthRule, RowSumRule, ValidationRule, build_rules};
pub use validator::DocumentValidator;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Free-form diagnostic facts attached to an outcome, keyed by label.
pub type Details = serde_json::Map<String, Value>;

/// Build a [`Details`] map from label/value pairs.
pub fn details<I>(entries: I) -> Details
where
    I: IntoIterator<Item = (&'static str, Value)>,
{
    entries
        .into_iter()
        .map(|(label, value)| (label.to_string(), value))
        .collect()
}

/// Result category of one rule evaluation.
///
/// Only `Valid` versus everything else is significant when reporting; the
/// remaining variants tell reviewers what kind of remediation is needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationStatus {
    /// The document satisfies the rule.
    Valid,
    /// Content is present and well-formed but out of bounds.
    Invalid,
    /// The element the rule depends on is absent.
    NotFound,
    /// The element exists but is empty or unusable.
    NotProcessed,
    /// The content could not be interpreted.
    Error,
}

impl ValidationStatus {
    pub fn is_valid(self) -> bool {
        self == ValidationStatus::Valid
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ValidationStatus::Valid => "VALID",
            ValidationStatus::Invalid => "INVALID",
            ValidationStatus::NotFound => "NOT_FOUND",
            ValidationStatus::NotProcessed => "NOT_PROCESSED",
            ValidationStatus::Error => "ERROR",
        }
    }
}

impl std::fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status plus diagnostic details of one rule evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    pub status: ValidationStatus,
    pub details: Details,
}

impl ValidationOutcome {
    pub fn new(status: ValidationStatus, details: Details) -> Self {
        Self { status, details }
    }

    pub fn is_valid(&self) -> bool {
        self.status.is_valid()
    }
}

/// An outcome labelled with the rule that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleOutcome {
    pub rule: &'static str,
    #[serde(flatten)]
    pub outcome: ValidationOutcome,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_serialization() {
        assert_eq!(serde_json::to_value(ValidationStatus::NotProcessed).unwrap(), json!("NOT_PROCESSED"));
        let status: ValidationStatus = serde_json::from_value(json!("ERROR")).unwrap();
        assert_eq!(status, ValidationStatus::Error);
        assert_eq!(ValidationStatus::NotFound.to_string(), "NOT_FOUND");
    }

    #[test]
    fn test_only_valid_is_valid() {
        let all = [
            ValidationStatus::Valid,
            ValidationStatus::Invalid,
            ValidationStatus::NotFound,
            ValidationStatus::NotProcessed,
            ValidationStatus::Error,
        ];
        let valid: Vec<_> = all.iter().filter(|s| s.is_valid()).collect();
        assert_eq!(valid, vec![&ValidationStatus::Valid]);
    }

    #[test]
    fn test_rule_outcome_serialization() {
        let outcome = RuleOutcome {
            rule: "Row-Sum",
            outcome: ValidationOutcome::new(
                ValidationStatus::Invalid,
                details([("Location", json!("tbody"))]),
            ),
        };

        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            json!({"rule": "Row-Sum", "status": "INVALID", "details": {"Location": "tbody"}})
        );
    }
}
