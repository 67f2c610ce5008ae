//! Error types for the reportlint-core library.

use thiserror::Error;

/// Main error type for the reportlint library.
#[derive(Error, Debug)]
pub enum ReportError {
    /// Field extraction setup error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Document store error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Record serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A batch worker could not be scheduled or panicked.
    #[error("worker error: {0}")]
    Worker(String),
}

/// Errors raised while compiling extraction patterns.
///
/// These surface when a pipeline is built, never while a document is being
/// processed: a malformed document only ever yields null fields.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// A regular expression failed to compile.
    #[error("invalid pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// The country/date pattern must capture a date and a country.
    #[error("pattern {pattern:?} has {groups} capture groups, expected at least 2 (date, country)")]
    MissingGroups { pattern: String, groups: usize },
}

/// Errors related to the document store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// An operation was attempted before `connect`.
    #[error("store is not connected")]
    NotConnected,

    /// The record is not a JSON object.
    #[error("invalid record: {0}")]
    InvalidRecord(String),

    /// Collection names map to file names and must be simple.
    #[error("invalid collection name: {0}")]
    InvalidCollection(String),

    /// Backing file I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored line could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Another thread panicked while holding the store lock.
    #[error("store lock poisoned")]
    Poisoned,
}

/// Errors related to configuration values.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configured maximum date is not a calendar date.
    #[error("invalid max date {year:04}-{month:02}-{day:02}")]
    InvalidMaxDate { year: i32, month: u32, day: u32 },

    /// No validation rules are configured.
    #[error("no validation rules configured")]
    NoRules,

    /// A configuration key does not exist.
    #[error("unknown configuration key: {0}")]
    UnknownKey(String),
}

/// Result type for the reportlint library.
pub type Result<T> = std::result::Result<T, ReportError>;
