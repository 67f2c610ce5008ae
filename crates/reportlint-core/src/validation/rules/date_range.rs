//! Footer date cutoff validation.

use chrono::NaiveDate;
use regex::Regex;
use serde_json::json;

use crate::document::{ParsedDocument, text_of};
use crate::error::ExtractionError;
use crate::extract::footer::{format_canonical, parse_date};
use crate::extract::patterns::{DATE_TOKEN, DEFAULT_DATE_FORMAT, compile};
use crate::validation::{ValidationOutcome, ValidationStatus, details};

/// Flags footers dated after an as-of cutoff.
///
/// A date token that does not parse under the configured format is an
/// `ERROR` (fix the input), while a well-formed date past the cutoff or a
/// footer without any date token is `INVALID`.
#[derive(Debug, Clone)]
pub struct DateRangeRule {
    max_date: NaiveDate,
    date_regex: Regex,
    date_format: String,
    footer_tag: String,
}

impl DateRangeRule {
    pub const NAME: &'static str = "Date-Range";

    /// Create a rule; the whole match of `date_regex` is the date token.
    pub fn new(
        max_date: NaiveDate,
        date_regex: &str,
        date_format: impl Into<String>,
        footer_tag: impl Into<String>,
    ) -> Result<Self, ExtractionError> {
        Ok(Self {
            max_date,
            date_regex: compile(date_regex)?,
            date_format: date_format.into(),
            footer_tag: footer_tag.into(),
        })
    }

    /// Rule using the `15Jan2024` token shape.
    pub fn with_default_pattern(max_date: NaiveDate, footer_tag: impl Into<String>) -> Self {
        Self {
            max_date,
            date_regex: DATE_TOKEN.clone(),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            footer_tag: footer_tag.into(),
        }
    }

    pub fn max_date(&self) -> NaiveDate {
        self.max_date
    }

    pub fn evaluate(&self, document: &ParsedDocument) -> ValidationOutcome {
        let location = json!(self.footer_tag);

        let Some(footer) = document.find(&self.footer_tag) else {
            return ValidationOutcome::new(
                ValidationStatus::NotFound,
                details([
                    ("Footer Tag Not Found", location.clone()),
                    ("Location", location),
                ]),
            );
        };

        let footer_text = text_of(footer);
        if footer_text.trim().is_empty() {
            return ValidationOutcome::new(
                ValidationStatus::NotProcessed,
                details([("Footer Tag Empty", json!(footer_text)), ("Location", location)]),
            );
        }

        let Some(token) = self.date_regex.find(&footer_text) else {
            return ValidationOutcome::new(
                ValidationStatus::Invalid,
                details([("Footer Date Missing", json!(footer_text)), ("Location", location)]),
            );
        };

        let Some(date) = parse_date(token.as_str(), &self.date_format) else {
            return ValidationOutcome::new(
                ValidationStatus::Error,
                details([
                    (
                        "Date Not In correct format",
                        json!({
                            "Expected Format": self.date_format,
                            "Actual Format": footer_text,
                            "Token": token.as_str(),
                        }),
                    ),
                    ("Location", location),
                ]),
            );
        };

        if date > self.max_date {
            ValidationOutcome::new(
                ValidationStatus::Invalid,
                details([
                    ("Date Greater Than Maximum", json!(format_canonical(date))),
                    ("Location", location),
                    ("Gotten Date", json!(date.to_string())),
                    ("Max Date", json!(format_canonical(self.max_date))),
                ]),
            )
        } else {
            ValidationOutcome::new(
                ValidationStatus::Valid,
                details([("Date Is Valid", json!(footer_text)), ("Location", location)]),
            )
        }
    }
}
