//! Config command - manage configuration.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use console::style;
use serde_json::Value;

use reportlint_core::ReportlintConfig;
use reportlint_core::error::ConfigError;

use super::config_path;

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Show current configuration
    Show,

    /// Initialize a new configuration file
    Init(InitArgs),

    /// Get a specific configuration value
    Get {
        /// Configuration key (e.g., "validation.max_row_sum")
        key: String,
    },

    /// Set a configuration value
    Set {
        /// Configuration key
        key: String,
        /// New value (JSON, or a bare string)
        value: String,
    },

    /// Show configuration file path
    Path,
}

#[derive(Args)]
struct InitArgs {
    /// Output path for configuration file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Overwrite existing file
    #[arg(long)]
    force: bool,
}

pub fn run(args: ConfigArgs, explicit_path: Option<&str>) -> anyhow::Result<()> {
    let path = config_path(explicit_path);

    match args.command {
        ConfigCommand::Show => show_config(&path),
        ConfigCommand::Init(init_args) => init_config(init_args, &path),
        ConfigCommand::Get { key } => get_config(&path, &key),
        ConfigCommand::Set { key, value } => set_config(&path, &key, &value),
        ConfigCommand::Path => show_path(&path),
    }
}

fn load_or_default(path: &Path) -> anyhow::Result<ReportlintConfig> {
    if path.exists() {
        Ok(ReportlintConfig::from_file(path)?)
    } else {
        Ok(ReportlintConfig::default())
    }
}

fn show_config(path: &Path) -> anyhow::Result<()> {
    if !path.exists() {
        eprintln!(
            "{} No config file found, showing defaults.",
            style("ℹ").blue()
        );
    }

    let config = load_or_default(path)?;
    println!("{}", serde_json::to_string_pretty(&config)?);

    Ok(())
}

fn init_config(args: InitArgs, default_path: &Path) -> anyhow::Result<()> {
    let output_path = args.output.unwrap_or_else(|| default_path.to_path_buf());

    if output_path.exists() && !args.force {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            output_path.display()
        );
    }

    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)?;
    }

    ReportlintConfig::default().save(&output_path)?;

    println!(
        "{} Created configuration file at {}",
        style("✓").green(),
        output_path.display()
    );

    Ok(())
}

/// Value at a dotted key path.
fn lookup<'v>(json: &'v Value, key: &str) -> Option<&'v Value> {
    key.split('.').try_fold(json, |current, part| current.get(part))
}

fn get_config(path: &Path, key: &str) -> anyhow::Result<()> {
    let json = serde_json::to_value(load_or_default(path)?)?;
    let value = lookup(&json, key).ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;

    println!("{}", serde_json::to_string_pretty(value)?);

    Ok(())
}

fn set_config(path: &Path, key: &str, value: &str) -> anyhow::Result<()> {
    let config = load_or_default(path)?;

    let parsed_value: Value =
        serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));

    let mut json = serde_json::to_value(&config)?;

    let (parent_key, field) = match key.rsplit_once('.') {
        Some((parent, field)) => (Some(parent), field),
        None => (None, key),
    };

    let parent = match parent_key {
        Some(parent_key) => parent_key
            .split('.')
            .try_fold(&mut json, |current, part| current.get_mut(part)),
        None => Some(&mut json),
    };

    match parent.and_then(Value::as_object_mut) {
        Some(object) => {
            object.insert(field.to_string(), parsed_value.clone());
        }
        None => return Err(ConfigError::UnknownKey(key.to_string()).into()),
    }

    let updated: ReportlintConfig = serde_json::from_value(json)?;

    // Unknown fields are dropped by deserialization, so check the key survived
    let round_trip = serde_json::to_value(&updated)?;
    if lookup(&round_trip, key).is_none() {
        return Err(ConfigError::UnknownKey(key.to_string()).into());
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    updated.save(path)?;

    println!(
        "{} Set {} = {}",
        style("✓").green(),
        key,
        serde_json::to_string(&parsed_value)?
    );

    Ok(())
}

fn show_path(path: &Path) -> anyhow::Result<()> {
    println!("Configuration file: {}", path.display());

    if path.exists() {
        println!("Status: {}", style("exists").green());
    } else {
        println!("Status: {}", style("not created").yellow());
        println!();
        println!("Run 'reportlint config init' to create a configuration file.");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_lookup_nested_key() {
        let json = json!({"validation": {"max_row_sum": 1000}});
        assert_eq!(lookup(&json, "validation.max_row_sum"), Some(&json!(1000)));
        assert_eq!(lookup(&json, "validation.missing"), None);
    }

    #[test]
    fn test_set_writes_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.json");

        set_config(&path, "validation.max_row_sum", "250").unwrap();
        set_config(&path, "storage.backend", "memory").unwrap();
        set_config(&path, "validation.max_date", r#"{"year": 2024, "month": 2, "day": 29}"#).unwrap();

        let config = ReportlintConfig::from_file(&path).unwrap();
        assert_eq!(config.validation.max_row_sum, 250);
        assert_eq!(config.storage.backend, reportlint_core::StoreKind::Memory);
        assert!(config.validation.max_date.is_some());
    }

    #[test]
    fn test_set_rejects_unknown_key() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");

        assert!(set_config(&path, "validation.nonsense", "1").is_err());
        assert!(set_config(&path, "nowhere.key", "1").is_err());
        assert!(!path.exists());
    }
}
