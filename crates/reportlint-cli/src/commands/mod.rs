//! CLI subcommands.

pub mod check;
pub mod config;
pub mod run;

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use clap::Args;
use tracing::debug;

use reportlint_core::ReportlintConfig;

/// Validation thresholds that can be overridden per invocation.
#[derive(Args, Debug, Default)]
pub struct ThresholdArgs {
    /// Latest acceptable footer date (YYYY-MM-DD, default: today)
    #[arg(long, value_name = "DATE")]
    max_date: Option<NaiveDate>,

    /// Maximum header length in characters
    #[arg(long)]
    header_max_length: Option<usize>,

    /// Maximum sum of the first body row
    #[arg(long, allow_negative_numbers = true)]
    max_row_sum: Option<i64>,
}

impl ThresholdArgs {
    pub fn apply(&self, config: &mut ReportlintConfig) {
        if let Some(date) = self.max_date {
            config.validation.max_date = Some(date.into());
        }
        if let Some(length) = self.header_max_length {
            config.validation.header_max_length = length;
        }
        if let Some(sum) = self.max_row_sum {
            config.validation.max_row_sum = sum;
        }
    }
}

pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("reportlint")
        .join("config.json")
}

/// The explicit config path, or the default location.
pub fn config_path(explicit: Option<&str>) -> PathBuf {
    explicit.map(PathBuf::from).unwrap_or_else(default_config_path)
}

/// Load the configuration an invocation runs with.
///
/// An explicit path must exist; the default location is optional.
pub fn load_config(explicit: Option<&str>) -> anyhow::Result<ReportlintConfig> {
    if let Some(path) = explicit {
        debug!("Loading configuration from {}", path);
        return Ok(ReportlintConfig::from_file(Path::new(path))?);
    }

    let path = default_config_path();
    if path.exists() {
        debug!("Loading configuration from {}", path.display());
        Ok(ReportlintConfig::from_file(&path)?)
    } else {
        Ok(ReportlintConfig::default())
    }
}
