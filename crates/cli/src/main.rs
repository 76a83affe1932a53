//! Funnelkit CLI - Database migrations and funnel tooling.
//!
//! # Usage
//!
//! ```bash
//! # Run admin database migrations
//! fk-cli migrate
//!
//! # Validate a funnel document the way checkout would read it
//! fk-cli funnel validate funnels.json
//!
//! # Trim order analytics past the retention window
//! fk-cli analytics cleanup --days 90
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `funnel validate` - Parse a funnel JSON document and report what survives
//! - `analytics cleanup` - Delete order records older than the retention window

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "fk-cli")]
#[command(author, version, about = "Funnelkit CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run admin database migrations
    Migrate,
    /// Inspect funnel documents
    Funnel {
        #[command(subcommand)]
        action: FunnelAction,
    },
    /// Analytics maintenance
    Analytics {
        #[command(subcommand)]
        action: AnalyticsAction,
    },
}

#[derive(Subcommand)]
enum AnalyticsAction {
    /// Delete order records older than the retention window
    Cleanup {
        /// Retention window in days
        #[arg(long, default_value_t = 90)]
        days: i64,
    },
}

#[derive(Subcommand)]
enum FunnelAction {
    /// Validate a funnel JSON document
    Validate {
        /// Path to the JSON file (the metafield value)
        path: std::path::PathBuf,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::admin().await?,
        Commands::Funnel { action } => match action {
            FunnelAction::Validate { path } => commands::funnel::validate(&path)?,
        },
        Commands::Analytics { action } => match action {
            AnalyticsAction::Cleanup { days } => commands::analytics::cleanup(days).await?,
        },
    }
    Ok(())
}
