//! First row total validation.

use std::num::IntErrorKind;

use serde_json::{Value, json};

use crate::document::{ParsedDocument, find_all_within, find_within, text_of};
use crate::validation::{ValidationOutcome, ValidationStatus, details};

/// Flags documents whose first body row sums above a configured maximum.
///
/// Non-numeric cells are skipped and do not contribute to the sum.
#[derive(Debug, Clone)]
pub struct RowSumRule {
    max_sum: i64,
    row_container: String,
}

impl RowSumRule {
    pub const NAME: &'static str = "Row-Sum";

    pub fn new(max_sum: i64, row_container: impl Into<String>) -> Self {
        Self {
            max_sum,
            row_container: row_container.into(),
        }
    }

    pub fn max_sum(&self) -> i64 {
        self.max_sum
    }

    pub fn evaluate(&self, document: &ParsedDocument) -> ValidationOutcome {
        let location = json!(self.row_container);

        let Some(container) = document.find(&self.row_container) else {
            return ValidationOutcome::new(
                ValidationStatus::NotFound,
                details([
                    ("Row Container Not Found", location.clone()),
                    ("Location", location),
                ]),
            );
        };

        let first_row: Vec<String> = find_within(container, "tr")
            .map(|row| {
                find_all_within(row, "td")
                    .into_iter()
                    .map(|cell| text_of(cell).trim().to_string())
                    .collect()
            })
            .unwrap_or_default();

        if first_row.is_empty() {
            return ValidationOutcome::new(
                ValidationStatus::NotProcessed,
                details([("First Row Empty", json!(first_row)), ("Location", location)]),
            );
        }

        let mut total: i128 = 0;
        for value in &first_row {
            let number = match value.parse::<i128>() {
                Ok(number) => number,
                Err(e) => match e.kind() {
                    IntErrorKind::PosOverflow => i128::MAX,
                    IntErrorKind::NegOverflow => i128::MIN,
                    _ => continue,
                },
            };
            total = total.saturating_add(number);
        }

        if total > i128::from(self.max_sum) {
            ValidationOutcome::new(
                ValidationStatus::Invalid,
                details([
                    (
                        "First Row Total Sum Greater Than Max",
                        json!({
                            "Max Total": self.max_sum,
                            "Row Total": total_value(total),
                        }),
                    ),
                    ("Location", location),
                ]),
            )
        } else {
            ValidationOutcome::new(
                ValidationStatus::Valid,
                details([
                    ("First Row", json!(first_row)),
                    ("Row Total", total_value(total)),
                    ("Location", location),
                ]),
            )
        }
    }
}

/// Totals outside the `i64` range are reported as decimal strings.
fn total_value(total: i128) -> Value {
    i64::try_from(total).map_or_else(|_| Value::String(total.to_string()), Value::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn doc_with_rows(rows: &[&[&str]]) -> ParsedDocument {
        let body: String = rows
            .iter()
            .map(|cells| {
                let tds: String = cells.iter().map(|c| format!("<td>{c}</td>")).collect();
                format!("<tr>{tds}</tr>")
            })
            .collect();
        ParsedDocument::parse(&format!("<table><tbody>{body}</tbody></table>"))
    }

    #[test]
    fn test_non_numeric_cells_are_skipped() {
        let doc = doc_with_rows(&[&["10", "abc", "5"]]);
        let outcome = RowSumRule::new(20, "tbody").evaluate(&doc);

        assert_eq!(outcome.status, ValidationStatus::Valid);
        assert_eq!(outcome.details["Row Total"], json!(15));
        assert_eq!(outcome.details["First Row"], json!(["10", "abc", "5"]));
    }

    #[test]
    fn test_sum_over_max_is_invalid() {
        let doc = doc_with_rows(&[&["10", " 11 "]]);
        let outcome = RowSumRule::new(20, "tbody").evaluate(&doc);

        assert_eq!(outcome.status, ValidationStatus::Invalid);
        assert_eq!(
            outcome.details["First Row Total Sum Greater Than Max"],
            json!({"Max Total": 20, "Row Total": 21})
        );
    }

    #[test]
    fn test_only_first_row_counts() {
        let doc = doc_with_rows(&[&["1", "2"], &["500", "600"]]);
        let outcome = RowSumRule::new(5, "tbody").evaluate(&doc);
        assert_eq!(outcome.status, ValidationStatus::Valid);
    }

    #[test]
    fn test_negative_values() {
        let doc = doc_with_rows(&[&["30", "-15"]]);
        let outcome = RowSumRule::new(20, "tbody").evaluate(&doc);

        assert_eq!(outcome.status, ValidationStatus::Valid);
        assert_eq!(outcome.details["Row Total"], json!(15));
    }

    #[test]
    fn test_missing_container() {
        let doc = ParsedDocument::parse("<table><thead><tr><th>A</th></tr></thead></table>");
        let outcome = RowSumRule::new(20, "tbody").evaluate(&doc);

        assert_eq!(outcome.status, ValidationStatus::NotFound);
        assert_eq!(outcome.details["Row Container Not Found"], json!("tbody"));
    }

    #[test]
    fn test_row_without_data_cells() {
        let doc = ParsedDocument::parse("<table><tbody><tr><th>Total</th></tr></tbody></table>");
        let outcome = RowSumRule::new(20, "tbody").evaluate(&doc);
        assert_eq!(outcome.status, ValidationStatus::NotProcessed);
    }

    #[test]
    fn test_totals_beyond_i64_are_over_limit() {
        let doc = doc_with_rows(&[&["9223372036854775807", "1"]]);
        let outcome = RowSumRule::new(20, "tbody").evaluate(&doc);
        assert_eq!(outcome.status, ValidationStatus::Invalid);
        assert_eq!(
            outcome.details["First Row Total Sum Greater Than Max"]["Row Total"],
            json!("9223372036854775808")
        );

        let doc = doc_with_rows(&[&["99999999999999999999"]]);
        let outcome = RowSumRule::new(20, "tbody").evaluate(&doc);
        assert_eq!(outcome.status, ValidationStatus::Invalid);
        assert_eq!(
            outcome.details["First Row Total Sum Greater Than Max"]["Row Total"],
            json!("99999999999999999999")
        );
    }

    #[test]
    fn test_cells_beyond_i128_saturate() {
        let huge = "9".repeat(60);
        let doc = doc_with_rows(&[&[huge.as_str(), "5"]]);
        let outcome = RowSumRule::new(i64::MAX, "tbody").evaluate(&doc);

        assert_eq!(outcome.status, ValidationStatus::Invalid);
        assert_eq!(
            outcome.details["First Row Total Sum Greater Than Max"]["Row Total"],
            json!(i128::MAX.to_string())
        );
    }

    #[test]
    fn test_rows_outside_body_section_are_not_found() {
        let doc = ParsedDocument::parse("<table><tr><td>5</td></tr></table>");
        let outcome = RowSumRule::new(20, "tbody").evaluate(&doc);
        assert_eq!(outcome.status, ValidationStatus::NotFound);
    }
}
