//! MissionLoom CLI — the main entry point.
//!
//! Commands:
//! - `init`    — Write a default config file and create the event store
//! - `ingest`  — Load simulation export files into the store
//! - `build`   — Assemble, window, and write the training dataset
//! - `status`  — Show store contents and configuration

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "missionloom",
    about = "MissionLoom — mission-event training dataset pipeline",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the config file
    #[arg(short, long, global = true, default_value = "missionloom.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default config file and create the event store
    Init,

    /// Load simulation export files into the store
    Ingest {
        /// JSON export files to ingest
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Assemble, window, and write the training dataset
    Build {
        /// Override the output directory
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show store contents and configuration
    Status,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Init => commands::init::run(&cli.config).await?,
        Commands::Ingest { files } => commands::ingest::run(&cli.config, &files).await?,
        Commands::Build { output } => commands::build::run(&cli.config, output).await?,
        Commands::Status => commands::status::run(&cli.config).await?,
    }

    Ok(())
}
