//! Persisted record shapes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::validation::{Details, ValidationStatus};

/// The normalized representation of one input report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    /// Identifier attribute of the identifying container.
    pub document_id: Option<String>,

    /// Title text.
    pub title: Option<String>,

    /// Header container markup (empty when absent).
    pub header: String,

    /// Body container markup (empty when absent).
    pub body: String,

    /// Footer container markup (empty when absent).
    pub footer: String,

    /// Creation date as `dd-mm-yyyy`.
    pub creation_date: Option<String>,

    /// Country of origin.
    pub country: Option<String>,
}

impl CanonicalRecord {
    /// Serialize into a store record.
    pub fn to_value(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}

/// A persisted non-valid validation outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscrepancyRecord {
    /// Rule-specific diagnostic facts.
    #[serde(flatten)]
    pub details: Details,

    /// Name of the rule that produced the outcome.
    pub discrepancy_type: String,

    /// Status the rule reported.
    pub validation_status: ValidationStatus,

    /// Persisted identifier of the owning canonical record.
    pub document_id: String,
}

impl DiscrepancyRecord {
    /// Build a discrepancy from a rule outcome.
    pub fn new(
        rule: &str,
        status: ValidationStatus,
        details: Details,
        document_id: impl Into<String>,
    ) -> Self {
        Self {
            details,
            discrepancy_type: rule.to_string(),
            validation_status: status,
            document_id: document_id.into(),
        }
    }

    /// Serialize into a store record.
    pub fn to_value(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_record_field_names() {
        let record = CanonicalRecord {
            document_id: Some("r-1".to_string()),
            title: None,
            header: "<thead></thead>".to_string(),
            body: String::new(),
            footer: String::new(),
            creation_date: Some("15-01-2024".to_string()),
            country: None,
        };

        assert_eq!(
            record.to_value().unwrap(),
            json!({
                "document_id": "r-1",
                "title": null,
                "header": "<thead></thead>",
                "body": "",
                "footer": "",
                "creation_date": "15-01-2024",
                "country": null,
            })
        );
    }

    #[test]
    fn test_discrepancy_flattens_details() {
        let mut details = Details::new();
        details.insert("Location".to_string(), json!("tbody"));

        let record = DiscrepancyRecord::new("Row-Sum", ValidationStatus::NotFound, details, "abc");

        assert_eq!(
            record.to_value().unwrap(),
            json!({
                "Location": "tbody",
                "discrepancy_type": "Row-Sum",
                "validation_status": "NOT_FOUND",
                "document_id": "abc",
            })
        );
    }
}
