//! Rule orchestrator with a swappable active rule.

use tracing::debug;

use super::rules::ValidationRule;
use super::{RuleOutcome, ValidationOutcome};
use crate::document::ParsedDocument;

/// Runs one active rule at a time against a document.
///
/// The active rule can be replaced between calls, letting one validator drive
/// a sequence of different rules. Validators are cheap and hold only a
/// borrow of the rule, so each worker builds its own instead of sharing one.
#[derive(Debug, Clone, Copy)]
pub struct DocumentValidator<'r> {
    strategy: &'r ValidationRule,
}

impl<'r> DocumentValidator<'r> {
    pub fn new(strategy: &'r ValidationRule) -> Self {
        Self { strategy }
    }

    /// The active rule.
    pub fn strategy(&self) -> &'r ValidationRule {
        self.strategy
    }

    /// Replace the active rule.
    pub fn set_strategy(&mut self, strategy: &'r ValidationRule) {
        self.strategy = strategy;
    }

    /// Evaluate the active rule; the outcome is returned as the rule produced it.
    pub fn validate(&self, document: &ParsedDocument) -> ValidationOutcome {
        self.strategy.evaluate(document)
    }

    /// Cycle through `rules` in order, making each the active rule in turn.
    ///
    /// The last rule stays active afterwards.
    pub fn validate_each(
        &mut self,
        rules: &'r [ValidationRule],
        document: &ParsedDocument,
    ) -> Vec<RuleOutcome> {
        let mut outcomes = Vec::with_capacity(rules.len());

        for rule in rules {
            self.set_strategy(rule);
            let outcome = self.validate(document);
            debug!("{} -> {}", rule.name(), outcome.status);

            outcomes.push(RuleOutcome {
                rule: rule.name(),
                outcome,
            });
        }

        outcomes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::rules::{HeaderLengthRule, RowSumRule};
    use crate::validation::ValidationStatus;
    use pretty_assertions::assert_eq;

    const DOC: &str = "<table><thead><tr><th>Region</th></tr></thead><tbody><tr><td>7</td><td>8</td></tr></tbody></table>";

    #[test]
    fn test_validate_delegates_to_active_rule() {
        let doc = ParsedDocument::parse(DOC);
        let rule = ValidationRule::from(RowSumRule::new(10, "tbody"));
        let validator = DocumentValidator::new(&rule);

        assert_eq!(validator.validate(&doc), rule.evaluate(&doc));
        assert_eq!(validator.validate(&doc).status, ValidationStatus::Invalid);
    }

    #[test]
    fn test_swap_does_not_change_earlier_outcome() {
        let doc = ParsedDocument::parse(DOC);
        let row_sum = ValidationRule::from(RowSumRule::new(10, "tbody"));
        let header = ValidationRule::from(HeaderLengthRule::new(100, "thead"));

        let mut validator = DocumentValidator::new(&row_sum);
        let first = validator.validate(&doc);
        let snapshot = first.clone();

        validator.set_strategy(&header);
        let second = validator.validate(&doc);

        assert_eq!(first, snapshot);
        assert_eq!(first.status, ValidationStatus::Invalid);
        assert_eq!(second.status, ValidationStatus::Valid);
        assert_eq!(validator.strategy().name(), "Header-Length");
    }

    #[test]
    fn test_validate_each_keeps_order() {
        let doc = ParsedDocument::parse(DOC);
        let rules = vec![
            ValidationRule::from(HeaderLengthRule::new(3, "thead")),
            ValidationRule::from(RowSumRule::new(100, "tbody")),
        ];

        let mut validator = DocumentValidator::new(&rules[0]);
        let outcomes = validator.validate_each(&rules, &doc);

        let summary: Vec<_> = outcomes.iter().map(|o| (o.rule, o.outcome.status)).collect();
        assert_eq!(
            summary,
            vec![
                ("Header-Length", ValidationStatus::Invalid),
                ("Row-Sum", ValidationStatus::Valid),
            ]
        );
        assert_eq!(validator.strategy().name(), "Row-Sum");
    }
}
