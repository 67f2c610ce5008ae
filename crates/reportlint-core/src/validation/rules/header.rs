//! Header length validation.

use serde_json::json;

use crate::document::{ParsedDocument, find_all_within, text_of};
use crate::validation::{ValidationOutcome, ValidationStatus, details};

/// Flags headers whose text is longer than a configured limit.
#[derive(Debug, Clone)]
pub struct HeaderLengthRule {
    max_length: usize,
    header_tag: String,
}

impl HeaderLengthRule {
    pub const NAME: &'static str = "Header-Length";

    pub fn new(max_length: usize, header_tag: impl Into<String>) -> Self {
        Self {
            max_length,
            header_tag: header_tag.into(),
        }
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    pub fn header_tag(&self) -> &str {
        &self.header_tag
    }

    pub fn evaluate(&self, document: &ParsedDocument) -> ValidationOutcome {
        let location = json!(self.header_tag);

        let Some(header) = document.find(&self.header_tag) else {
            return ValidationOutcome::new(
                ValidationStatus::NotFound,
                details([
                    ("Header Tag Not Found", location.clone()),
                    ("Location", location),
                ]),
            );
        };

        // Table headers are measured by their cell captions only
        let content: String = if self.header_tag.eq_ignore_ascii_case("thead") {
            find_all_within(header, "th").into_iter().map(text_of).collect()
        } else {
            text_of(header)
        };

        if content.trim().is_empty() {
            return ValidationOutcome::new(
                ValidationStatus::NotProcessed,
                details([("Header Tag Empty", json!(content)), ("Location", location)]),
            );
        }

        let length = content.chars().count();
        if length > self.max_length {
            ValidationOutcome::new(
                ValidationStatus::Invalid,
                details([
                    ("header", json!(content)),
                    ("Location", location),
                    ("Details", json!("Header content too long")),
                    ("Max Length", json!(self.max_length)),
                    ("Current Length", json!(length)),
                ]),
            )
        } else {
            ValidationOutcome::new(
                ValidationStatus::Valid,
                details([
                    ("header", json!(content)),
                    ("Location", location),
                    ("Current Length", json!(length)),
                ]),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn doc_with_header(cells: &[&str]) -> ParsedDocument {
        let ths: String = cells.iter().map(|c| format!("<th>{c}</th>")).collect();
        ParsedDocument::parse(&format!(
            "<table><thead><tr>{ths}</tr></thead><tbody><tr><td>1</td></tr></tbody></table>"
        ))
    }

    #[test]
    fn test_length_at_limit_is_valid() {
        let doc = doc_with_header(&["abcde", "fghij"]);
        let outcome = HeaderLengthRule::new(10, "thead").evaluate(&doc);

        assert_eq!(outcome.status, ValidationStatus::Valid);
        assert_eq!(outcome.details["Current Length"], json!(10));
    }

    #[test]
    fn test_length_over_limit_is_invalid() {
        let doc = doc_with_header(&["abcde", "fghijk"]);
        let outcome = HeaderLengthRule::new(10, "thead").evaluate(&doc);

        assert_eq!(outcome.status, ValidationStatus::Invalid);
        assert_eq!(outcome.details["Max Length"], json!(10));
        assert_eq!(outcome.details["Current Length"], json!(11));
        assert_eq!(outcome.details["header"], json!("abcdefghijk"));
    }

    #[test]
    fn test_thead_ignores_whitespace_between_cells() {
        let doc = ParsedDocument::parse(
            "<table><thead>\n  <tr>\n    <th>Name</th>\n    <th>Qty</th>\n  </tr>\n</thead></table>",
        );
        let outcome = HeaderLengthRule::new(7, "thead").evaluate(&doc);

        assert_eq!(outcome.status, ValidationStatus::Valid);
        assert_eq!(outcome.details["header"], json!("NameQty"));
    }

    #[test]
    fn test_non_table_header_uses_full_text() {
        let doc = ParsedDocument::parse("<header>Annual <b>Summary</b></header>");
        let outcome = HeaderLengthRule::new(5, "header").evaluate(&doc);

        assert_eq!(outcome.status, ValidationStatus::Invalid);
        assert_eq!(outcome.details["header"], json!("Annual Summary"));
    }

    #[test]
    fn test_length_counts_characters() {
        let doc = doc_with_header(&["Größe"]);
        let outcome = HeaderLengthRule::new(5, "thead").evaluate(&doc);
        assert_eq!(outcome.status, ValidationStatus::Valid);
    }

    #[test]
    fn test_missing_header() {
        let doc = ParsedDocument::parse("<table><tbody><tr><td>1</td></tr></tbody></table>");
        let outcome = HeaderLengthRule::new(10, "thead").evaluate(&doc);

        assert_eq!(outcome.status, ValidationStatus::NotFound);
        assert_eq!(outcome.details["Location"], json!("thead"));
    }

    #[test]
    fn test_empty_header() {
        let doc = doc_with_header(&[""]);
        let outcome = HeaderLengthRule::new(10, "thead").evaluate(&doc);
        assert_eq!(outcome.status, ValidationStatus::NotProcessed);
    }
}
