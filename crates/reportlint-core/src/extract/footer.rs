//! Creation date and country extraction from free text.

use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;

use super::patterns::{CANONICAL_DATE_FORMAT, CREATION_LINE, DEFAULT_DATE_FORMAT, compile};
use crate::error::ExtractionError;

/// A compiled country/date pattern and the format of its date token.
#[derive(Debug, Clone)]
pub struct FooterPattern {
    regex: Regex,
    date_format: String,
}

/// Facts pulled out of a footer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FooterFacts {
    /// Country token.
    pub country: Option<String>,
    /// Creation date as `dd-mm-yyyy`.
    pub creation_date: Option<String>,
}

impl FooterPattern {
    /// Compile a pattern whose first two capture groups are the date token
    /// and the country, in that order.
    pub fn new(pattern: &str, date_format: impl Into<String>) -> Result<Self, ExtractionError> {
        let regex = compile(pattern)?;

        // captures_len counts the implicit whole-match group
        let groups = regex.captures_len() - 1;
        if groups < 2 {
            return Err(ExtractionError::MissingGroups {
                pattern: pattern.to_string(),
                groups,
            });
        }

        Ok(Self {
            regex,
            date_format: date_format.into(),
        })
    }

    /// Input format of the date token.
    pub fn date_format(&self) -> &str {
        &self.date_format
    }

    /// Run the pattern against `text`.
    ///
    /// Country extraction does not depend on the date parsing: a token that
    /// does not match the date format still yields the country.
    pub fn extract(&self, text: &str) -> FooterFacts {
        let Some(caps) = self.regex.captures(text) else {
            return FooterFacts::default();
        };

        let creation_date = caps
            .get(1)
            .and_then(|m| parse_date(m.as_str(), &self.date_format))
            .map(format_canonical);
        let country = caps.get(2).map(|m| m.as_str().to_string());

        FooterFacts {
            country,
            creation_date,
        }
    }
}

impl Default for FooterPattern {
    fn default() -> Self {
        Self {
            regex: CREATION_LINE.clone(),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
        }
    }
}

/// Extract `(country, creation_date)` from `text`.
pub fn extract_date_and_country(
    text: &str,
    pattern: &FooterPattern,
) -> (Option<String>, Option<String>) {
    let facts = pattern.extract(text);
    (facts.country, facts.creation_date)
}

/// Parse a date token with a chrono format string.
///
/// Formats carrying a time component are accepted; only the calendar date is
/// kept.
pub fn parse_date(token: &str, format: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(token, format)
        .or_else(|_| NaiveDateTime::parse_from_str(token, format).map(|dt| dt.date()))
        .ok()
}

/// Format a date as `dd-mm-yyyy`.
pub fn format_canonical(date: NaiveDate) -> String {
    date.format(CANONICAL_DATE_FORMAT).to_string()
}
