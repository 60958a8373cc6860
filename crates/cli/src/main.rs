//! newsmap admin CLI.
//!
//! Manages the per-site sitemap settings and the post store, and renders
//! the sitemap to stdout. Logs go to stderr.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::Commands;

#[derive(Parser)]
#[command(name = "newsmap", version, about = "Google News sitemap administration")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "newsmap_core=warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    commands::run(cli.command).await
}
