//! Validation rules over parsed report documents.
//!
//! Every rule follows the same evaluation order:
//! 1. locate its anchor element (absent: `NOT_FOUND`)
//! 2. extract the content it checks (empty: `NOT_PROCESSED`)
//! 3. apply the business check (`INVALID`, `ERROR`, or `VALID`)

pub mod date_range;
pub mod header;
pub mod row_sum;

pub use date_range::DateRangeRule;
pub use header::HeaderLengthRule;
pub use row_sum::RowSumRule;

use super::ValidationOutcome;
use crate::document::ParsedDocument;
use crate::error::{ConfigError, Result};
use crate::models::config::{ReportlintConfig, RuleKind};

/// The closed set of validation rules.
///
/// Rule values are immutable once built and can be shared read-only between
/// workers.
#[derive(Debug, Clone)]
pub enum ValidationRule {
    HeaderLength(HeaderLengthRule),
    DateRange(DateRangeRule),
    RowSum(RowSumRule),
}

impl ValidationRule {
    /// Name recorded as `discrepancy_type`.
    pub fn name(&self) -> &'static str {
        match self {
            ValidationRule::HeaderLength(_) => HeaderLengthRule::NAME,
            ValidationRule::DateRange(_) => DateRangeRule::NAME,
            ValidationRule::RowSum(_) => RowSumRule::NAME,
        }
    }

    pub fn kind(&self) -> RuleKind {
        match self {
            ValidationRule::HeaderLength(_) => RuleKind::HeaderLength,
            ValidationRule::DateRange(_) => RuleKind::DateRange,
            ValidationRule::RowSum(_) => RuleKind::RowSum,
        }
    }

    /// Evaluate the rule against a document.
    pub fn evaluate(&self, document: &ParsedDocument) -> ValidationOutcome {
        match self {
            ValidationRule::HeaderLength(rule) => rule.evaluate(document),
            ValidationRule::DateRange(rule) => rule.evaluate(document),
            ValidationRule::RowSum(rule) => rule.evaluate(document),
        }
    }
}

impl From<HeaderLengthRule> for ValidationRule {
    fn from(rule: HeaderLengthRule) -> Self {
        ValidationRule::HeaderLength(rule)
    }
}

impl From<DateRangeRule> for ValidationRule {
    fn from(rule: DateRangeRule) -> Self {
        ValidationRule::DateRange(rule)
    }
}

impl From<RowSumRule> for ValidationRule {
    fn from(rule: RowSumRule) -> Self {
        ValidationRule::RowSum(rule)
    }
}

/// Build the configured rules, in configured order.
///
/// Anchor tags come from the extraction section so that a rule always looks
/// at the same container the record was assembled from.
pub fn build_rules(config: &ReportlintConfig) -> Result<Vec<ValidationRule>> {
    let validation = &config.validation;
    let extraction = &config.extraction;

    if validation.rules.is_empty() {
        return Err(ConfigError::NoRules.into());
    }

    let max_date = validation.resolve_max_date()?;

    validation
        .rules
        .iter()
        .map(|kind| -> Result<ValidationRule> {
            Ok(match kind {
                RuleKind::HeaderLength => {
                    HeaderLengthRule::new(validation.header_max_length, &extraction.head_tag).into()
                }
                RuleKind::DateRange => DateRangeRule::new(
                    max_date,
                    &validation.date_regex,
                    &validation.date_format,
                    &extraction.footer_tag,
                )?
                .into(),
                RuleKind::RowSum => RowSumRule::new(validation.max_row_sum, &extraction.body_tag).into(),
            })
        })
        .collect()
}
