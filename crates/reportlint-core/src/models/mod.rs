//! Data models for reportlint.

pub mod config;
pub mod record;

pub use config::{
    ExtractionConfig, MaxDate, PipelineConfig, ReportlintConfig, RuleKind, StorageConfig,
    ValidationConfig,
};
pub use record::{CanonicalRecord, DiscrepancyRecord};
