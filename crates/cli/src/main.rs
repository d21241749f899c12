//! dailybrief CLI: the main entry point.
//!
//! Commands:
//! - `assemble` - Build a budgeted work context from JSON sources
//! - `degrade`  - Fit a ranked list of enriched issues under a hard cap
//! - `config`   - Show, locate, or validate the configuration

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "dailybrief",
    about = "dailybrief — budget-aware work context for daily briefings",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Assemble issues, pull requests and project status into one document
    Assemble {
        /// JSON array of scored issues
        #[arg(long)]
        issues: Option<PathBuf>,

        /// JSON array of open pull requests
        #[arg(long)]
        pulls: Option<PathBuf>,

        /// JSON array of project status summaries
        #[arg(long)]
        projects: Option<PathBuf>,

        /// Override the token capacity
        #[arg(short, long)]
        capacity: Option<usize>,

        /// Price with the character approximation only
        #[arg(long)]
        approximate: bool,

        /// Print the document, report and stats as JSON
        #[arg(long)]
        json: bool,
    },

    /// Degrade a ranked list of enriched issues to fit a capacity
    Degrade {
        /// JSON array of enriched issues, highest rank first
        #[arg(long)]
        items: PathBuf,

        /// Override the token capacity
        #[arg(short, long)]
        capacity: Option<usize>,

        /// Print the full outcome as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration (secrets redacted)
    Show,
    /// Print the config file path
    Path,
    /// Validate the config file
    Validate,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays pipeable
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Assemble {
            issues,
            pulls,
            projects,
            capacity,
            approximate,
            json,
        } => {
            let inputs = commands::assemble::Inputs {
                issues,
                pulls,
                projects,
            };
            commands::assemble::run(inputs, capacity, approximate, json).await?
        }
        Commands::Degrade {
            items,
            capacity,
            json,
        } => commands::degrade::run(items, capacity, json).await?,
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config_cmd::show().await?,
            ConfigAction::Path => commands::config_cmd::path().await?,
            ConfigAction::Validate => commands::config_cmd::validate().await?,
        },
    }

    Ok(())
}
