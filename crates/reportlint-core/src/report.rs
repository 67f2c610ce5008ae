//! Discrepancy reporting.

use serde::Serialize;
use tracing::{debug, error};

use crate::models::record::DiscrepancyRecord;
use crate::store::DocumentStore;
use crate::validation::RuleOutcome;

/// Counts from reporting one document's outcomes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    /// Discrepancies persisted.
    pub reported: usize,
    /// Discrepancies the store rejected.
    pub failures: usize,
}

/// Persists every non-valid outcome as a [`DiscrepancyRecord`].
pub struct DiscrepancyReporter<'s> {
    store: &'s dyn DocumentStore,
    collection: &'s str,
}

impl<'s> DiscrepancyReporter<'s> {
    pub fn new(store: &'s dyn DocumentStore, collection: &'s str) -> Self {
        Self { store, collection }
    }

    /// Record one outcome. Valid outcomes are ignored and return `false`.
    pub fn report_one(&self, document_id: &str, outcome: &RuleOutcome) -> crate::Result<bool> {
        if outcome.outcome.is_valid() {
            return Ok(false);
        }

        let record = DiscrepancyRecord::new(
            outcome.rule,
            outcome.outcome.status,
            outcome.outcome.details.clone(),
            document_id,
        );
        let id = self.store.insert_one(self.collection, &record.to_value()?)?;
        debug!("Reported {} {} as {}", outcome.rule, outcome.outcome.status, id);
        Ok(true)
    }

    /// Record every non-valid outcome for a document.
    ///
    /// A failed write is logged and counted; it does not stop the remaining
    /// outcomes from being reported.
    pub fn report(&self, document_id: &str, outcomes: &[RuleOutcome]) -> ReportSummary {
        let mut summary = ReportSummary::default();

        for outcome in outcomes {
            match self.report_one(document_id, outcome) {
                Ok(true) => summary.reported += 1,
                Ok(false) => {}
                Err(e) => {
                    error!(
                        "Failed to report {} discrepancy for {}: {}",
                        outcome.rule, document_id, e
                    );
                    summary.failures += 1;
                }
            }
        }

        summary
    }
}
