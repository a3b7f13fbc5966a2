//! robustlinks CLI
//!
//! Preserves reference items at web archives through the Robust Links service.

use anyhow::Result;
use clap::{Parser, Subcommand};
use robust_links::archive::{run_archive, ArchiveArgs, ServiceConfig};
use robust_links::client::{DEFAULT_ENDPOINT, DEFAULT_TIMEOUT_MS};
use robust_links::init::{run_init, InitArgs};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "robustlinks")]
#[command(author = "RoyalBit Inc.")]
#[command(version)]
#[command(about = "Create Robust Links for reference items")]
#[command(long_about = "Archives the URL or DOI of each item at a web archive and records the memento as a \"Robust Link\" attachment.\n\nCommands:\n  init      Create a library.yaml template\n  archive   Create Robust Links for library items")]
struct Cli {
    /// Robust Links API endpoint
    #[arg(long, global = true, env = "ROBUSTLINKS_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Request timeout in milliseconds
    #[arg(long, global = true, env = "ROBUSTLINKS_TIMEOUT", default_value_t = DEFAULT_TIMEOUT_MS)]
    timeout: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a library.yaml template
    Init(InitArgs),
    /// Create Robust Links for items in a library file
    Archive(ArchiveArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let service = ServiceConfig {
        endpoint: cli.endpoint,
        timeout_ms: cli.timeout,
    };

    match cli.command {
        Commands::Init(args) => run_init(args).await,
        Commands::Archive(args) => run_archive(args, service).await,
    }
}
