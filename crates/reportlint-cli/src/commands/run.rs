//! Run command - validate a directory of reports.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use reportlint_core::pipeline::discover;
use reportlint_core::{BatchSummary, Pipeline, StoreKind, open_store};

use super::{ThresholdArgs, load_config};

/// Arguments for the run command.
#[derive(Args)]
pub struct RunArgs {
    /// Directory containing *.html reports
    #[arg(required = true)]
    input: PathBuf,

    /// Write every discrepancy and failure to a CSV file
    #[arg(long, value_name = "CSV")]
    summary: Option<PathBuf>,

    /// Number of parallel workers
    #[arg(short = 'j', long)]
    workers: Option<usize>,

    /// Store backend
    #[arg(long, value_name = "BACKEND")]
    store: Option<StoreKind>,

    /// Directory for the jsonl store
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Exit successfully even if some files could not be processed
    #[arg(long)]
    continue_on_error: bool,

    #[command(flatten)]
    thresholds: ThresholdArgs,
}

pub async fn run(args: RunArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    args.thresholds.apply(&mut config);
    if let Some(workers) = args.workers {
        config.pipeline.workers = workers;
    }
    if let Some(backend) = args.store {
        config.storage.backend = backend;
    }
    if let Some(data_dir) = &args.data_dir {
        config.storage.data_dir = data_dir.clone();
    }

    if !args.input.is_dir() {
        anyhow::bail!("Input directory not found: {}", args.input.display());
    }

    let files = discover(&args.input)?;
    if files.is_empty() {
        anyhow::bail!("No .html files found in {}", args.input.display());
    }

    println!(
        "{} Found {} reports to validate",
        style("ℹ").blue(),
        files.len()
    );

    let store = open_store(config.storage.backend, &config.storage);
    store.connect()?;
    info!("Using {} store", config.storage.backend);

    let pipeline = Arc::new(Pipeline::from_config(&config, Arc::clone(&store))?);

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} reports")?
            .progress_chars("=>-"),
    );

    let summary = pipeline
        .run_directory(&args.input, config.pipeline.workers, |path, result| {
            if let Err(e) = result {
                pb.println(format!("{} {}: {}", style("✗").red(), path.display(), e));
            }
            pb.inc(1);
        })
        .await?;

    pb.finish_and_clear();
    store.disconnect()?;

    if let Some(summary_path) = &args.summary {
        write_summary(summary_path, &summary)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    print_summary(&summary, config.storage.backend, &config.storage.data_dir);
    debug!("Total run time: {:?}", start.elapsed());

    if !summary.failures.is_empty() && !args.continue_on_error {
        anyhow::bail!("{} of {} files failed", summary.failures.len(), summary.total_files());
    }

    Ok(())
}

fn print_summary(summary: &BatchSummary, backend: StoreKind, data_dir: &Path) {
    let flagged = summary
        .reports
        .iter()
        .filter(|r| r.outcomes.iter().any(|o| !o.outcome.is_valid()))
        .count();

    println!();
    println!(
        "{} Validated {} reports",
        style("✓").green(),
        summary.reports.len()
    );
    println!(
        "   {} clean, {} with discrepancies, {} failed",
        style(summary.reports.len() - flagged).green(),
        style(flagged).yellow(),
        style(summary.failures.len()).red()
    );
    println!(
        "   {} discrepancies recorded",
        style(summary.discrepancies()).yellow()
    );

    if summary.report_failures() > 0 {
        println!(
            "   {} discrepancies could not be stored",
            style(summary.report_failures()).red()
        );
    }

    if backend == StoreKind::Jsonl {
        println!("   Results stored in {}", data_dir.display());
    }

    if !summary.failures.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for failure in &summary.failures {
            println!("  - {}: {}", failure.path.display(), failure.error);
        }
    }
}

fn write_summary(path: &Path, summary: &BatchSummary) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "record_id",
        "document_id",
        "discrepancy_type",
        "validation_status",
        "details",
        "error",
    ])?;

    for report in &summary.reports {
        let filename = file_name(report.source.as_deref());
        let document_id = report.record.document_id.clone().unwrap_or_default();

        for outcome in report.outcomes.iter().filter(|o| !o.outcome.is_valid()) {
            wtr.write_record([
                filename,
                report.record_id.as_str(),
                document_id.as_str(),
                outcome.rule,
                outcome.outcome.status.as_str(),
                &serde_json::to_string(&outcome.outcome.details)?,
                "",
            ])?;
        }
    }

    for failure in &summary.failures {
        wtr.write_record([
            file_name(Some(&failure.path)),
            "",
            "",
            "",
            "",
            "",
            &failure.error,
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

fn file_name(path: Option<&Path>) -> &str {
    path.and_then(|p| p.file_name())
        .and_then(|s| s.to_str())
        .unwrap_or("")
}
