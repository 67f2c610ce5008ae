//! Check command - validate a single report without persisting it.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use console::style;
use tracing::{debug, info};

use reportlint_core::{Inspection, MemoryStore, ParsedDocument, Pipeline};

use super::{ThresholdArgs, load_config};

/// Arguments for the check command.
#[derive(Args)]
pub struct CheckArgs {
    /// Input HTML report
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Exit with an error when any rule reports a discrepancy
    #[arg(long)]
    strict: bool,

    #[command(flatten)]
    thresholds: ThresholdArgs,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output, one row per rule
    Csv,
    /// Plain text summary
    Text,
}

pub fn run(args: CheckArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let mut config = load_config(config_path)?;
    args.thresholds.apply(&mut config);

    if !args.input.is_file() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Checking {}", args.input.display());

    let pipeline = Pipeline::from_config(&config, Arc::new(MemoryStore::new()))?;
    let document = ParsedDocument::from_file(&args.input)?;
    let inspection = pipeline.inspect(&document);

    let output = format_inspection(&inspection, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    let discrepancies = inspection.discrepancies().count();
    debug!("{} discrepancies in {}", discrepancies, args.input.display());

    if args.strict && discrepancies > 0 {
        anyhow::bail!("{} rule(s) reported discrepancies", discrepancies);
    }

    Ok(())
}

fn format_inspection(inspection: &Inspection, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(inspection)?),
        OutputFormat::Csv => format_csv(inspection),
        OutputFormat::Text => Ok(format_text(inspection)),
    }
}

fn format_csv(inspection: &Inspection) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(["document_id", "rule", "status", "details"])?;

    let document_id = inspection.record.document_id.clone().unwrap_or_default();
    for outcome in &inspection.outcomes {
        wtr.write_record([
            document_id.as_str(),
            outcome.rule,
            outcome.outcome.status.as_str(),
            &serde_json::to_string(&outcome.outcome.details)?,
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(inspection: &Inspection) -> String {
    let record = &inspection.record;
    let or_none = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());

    let mut output = String::new();

    output.push_str(&format!("Report: {}\n", or_none(&record.document_id)));
    output.push_str(&format!("Title: {}\n", or_none(&record.title)));
    output.push_str(&format!("Created: {}\n", or_none(&record.creation_date)));
    output.push_str(&format!("Country: {}\n", or_none(&record.country)));
    output.push('\n');

    output.push_str("Rules:\n");
    for outcome in &inspection.outcomes {
        output.push_str(&format!("  {:<14} {}\n", outcome.rule, outcome.outcome.status));
        if !outcome.outcome.is_valid() {
            for (label, value) in &outcome.outcome.details {
                output.push_str(&format!("    {}: {}\n", label, value));
            }
        }
    }

    output
}
