//! CLI application for validating HTML report documents.

mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{check, config, run};

/// reportlint - Extract and validate HTML report documents
#[derive(Parser)]
#[command(name = "reportlint")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate every report in a directory and store the results
    Run(run::RunArgs),

    /// Validate a single report without storing anything
    Check(check::CheckArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Run(args) => run::run(args, cli.config.as_deref()).await,
        Commands::Check(args) => check::run(args, cli.config.as_deref()),
        Commands::Config(args) => config::run(args, cli.config.as_deref()),
    }
}
