//! Common regex patterns for report extraction.

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::ExtractionError;

/// Output format of every normalized date.
pub const CANONICAL_DATE_FORMAT: &str = "%d-%m-%Y";

/// Default input format of footer date tokens, e.g. `15Jan2024`.
pub const DEFAULT_DATE_FORMAT: &str = "%d%b%Y";

lazy_static! {
    // Footer date token, e.g. "15Jan2024"
    pub static ref DATE_TOKEN: Regex = Regex::new(
        r"\d{1,2}[A-Za-z]{3}\d{4}"
    ).unwrap();

    // "Creation: <date> <country>" footer line
    pub static ref CREATION_LINE: Regex = Regex::new(
        r"Creation: (\d{1,2}[A-Za-z]{3}\d{4}) ([A-Za-z]+)"
    ).unwrap();
}

/// Compile a configured pattern.
pub fn compile(pattern: &str) -> Result<Regex, ExtractionError> {
    Regex::new(pattern).map_err(|e| ExtractionError::InvalidPattern {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })
}
