//! Core library for HTML report validation.
//!
//! This crate provides:
//! - HTML report parsing into an immutable document tree
//! - Canonical record extraction (identifier, title, header, body, footer, date, country)
//! - Rule-based validation (header length, date range, row sum) with a swappable orchestrator
//! - Discrepancy reporting into a pluggable document store
//! - A bounded batch runner over a directory of reports

pub mod document;
pub mod error;
pub mod extract;
pub mod models;
pub mod pipeline;
pub mod report;
pub mod store;
pub mod validation;

pub use document::ParsedDocument;
pub use error::{ReportError, Result};
pub use extract::{FieldQuery, FieldValue, FooterPattern, RecordAssembler};
pub use models::config::ReportlintConfig;
pub use models::record::{CanonicalRecord, DiscrepancyRecord};
pub use pipeline::{BatchSummary, DocumentReport, FileFailure, Inspection, Pipeline};
pub use report::{DiscrepancyReporter, ReportSummary};
pub use store::{DocumentStore, Filter, JsonlStore, MemoryStore, StoreKind, open_store};
pub use validation::{
    Details, DocumentValidator, RuleOutcome, ValidationOutcome, ValidationRule, ValidationStatus,
};
