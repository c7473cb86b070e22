//! API extractor CLI
//!
//! Command-line interface for paginated REST extraction

use anyhow::Context;
use api_extractor::cli::{Cli, Runner};
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();

    let runner = Runner::new(cli);
    let code = runner.run().await.context("api-extractor failed")?;

    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}
