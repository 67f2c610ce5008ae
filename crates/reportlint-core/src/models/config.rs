//! Configuration structures for the validation pipeline.

use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::extract::patterns::{CREATION_LINE, DATE_TOKEN, DEFAULT_DATE_FORMAT};
use crate::store::StoreKind;

/// Main configuration for the reportlint pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportlintConfig {
    /// Field extraction configuration.
    pub extraction: ExtractionConfig,

    /// Validation rule configuration.
    pub validation: ValidationConfig,

    /// Document store configuration.
    pub storage: StorageConfig,

    /// Batch runner configuration.
    pub pipeline: PipelineConfig,
}

/// Tag names and patterns used to build the canonical record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Tag of the identifying container.
    pub id_tag: String,

    /// Attribute of the identifying container holding the document id.
    pub id_attribute: String,

    /// Tag holding the document title.
    pub title_tag: String,

    /// Header container tag.
    pub head_tag: String,

    /// Body container tag.
    pub body_tag: String,

    /// Footer container tag.
    pub footer_tag: String,

    /// Extract creation date and country from the footer text.
    pub extract_country_and_date_from_footer: bool,

    /// Pattern with two capture groups: date token, country.
    pub country_date_regex: String,

    /// chrono format of the date token.
    pub date_format: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            id_tag: "table".to_string(),
            id_attribute: "id".to_string(),
            title_tag: "caption".to_string(),
            head_tag: "thead".to_string(),
            body_tag: "tbody".to_string(),
            footer_tag: "tfoot".to_string(),
            extract_country_and_date_from_footer: true,
            country_date_regex: CREATION_LINE.as_str().to_string(),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
        }
    }
}

/// A validation rule, as named in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    /// Header text length limit.
    HeaderLength,
    /// Footer date cutoff.
    DateRange,
    /// First row sum limit.
    RowSum,
}

/// Validation thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Maximum header length in characters.
    pub header_max_length: usize,

    /// Maximum sum of the first body row.
    pub max_row_sum: i64,

    /// Latest acceptable footer date. Defaults to the current date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_date: Option<MaxDate>,

    /// Pattern locating the date token in the footer.
    pub date_regex: String,

    /// chrono format of the footer date token.
    pub date_format: String,

    /// Rules to run, in order.
    pub rules: Vec<RuleKind>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            header_max_length: 100,
            max_row_sum: 1000,
            max_date: None,
            date_regex: DATE_TOKEN.as_str().to_string(),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            rules: vec![RuleKind::HeaderLength, RuleKind::DateRange, RuleKind::RowSum],
        }
    }
}

/// A year/month/day cutoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaxDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl MaxDate {
    /// Convert to a calendar date.
    pub fn to_date(self) -> Result<NaiveDate, ConfigError> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day).ok_or(ConfigError::InvalidMaxDate {
            year: self.year,
            month: self.month,
            day: self.day,
        })
    }
}

impl From<NaiveDate> for MaxDate {
    fn from(date: NaiveDate) -> Self {
        use chrono::Datelike;

        Self {
            year: date.year(),
            month: date.month(),
            day: date.day(),
        }
    }
}

impl ValidationConfig {
    /// The effective cutoff date, falling back to today.
    pub fn resolve_max_date(&self) -> Result<NaiveDate, ConfigError> {
        match self.max_date {
            Some(max_date) => max_date.to_date(),
            None => Ok(chrono::Local::now().date_naive()),
        }
    }
}

/// Document store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Store backend.
    pub backend: StoreKind,

    /// Directory for file-backed stores.
    pub data_dir: PathBuf,

    /// Collection receiving canonical records.
    pub documents_collection: String,

    /// Collection receiving discrepancies.
    pub discrepancies_collection: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StoreKind::Jsonl,
            data_dir: PathBuf::from("data"),
            documents_collection: "documents".to_string(),
            discrepancies_collection: "discrepancies".to_string(),
        }
    }
}

/// Batch runner configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Maximum number of documents processed concurrently.
    pub workers: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self { workers: 4 }
    }
}

impl ReportlintConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}
