//! CLI commands and argument parsing

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Paginated REST API extractor
#[derive(Parser, Debug)]
#[command(name = "api-extractor")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch every page of an endpoint and write the results
    Extract(ExtractArgs),

    /// Print normalized column names
    Normalize {
        /// Column names to normalize
        #[arg(required = true)]
        names: Vec<String>,
    },
}

/// Arguments for `extract`
#[derive(Args, Debug, Clone)]
pub struct ExtractArgs {
    /// Extractor config file (YAML or JSON)
    #[arg(short = 'C', long)]
    pub config: Option<PathBuf>,

    /// Endpoint URL (overrides the config file)
    #[arg(long)]
    pub url: Option<String>,

    /// Query parameter as key=value, repeatable
    #[arg(short = 'p', long = "param", value_parser = parse_param)]
    pub params: Vec<(String, String)>,

    /// Recoverable failures tolerated per page
    #[arg(long)]
    pub max_attempts: Option<u32>,

    /// Pause after each successful page, in seconds
    #[arg(long)]
    pub delay: Option<f64>,

    /// Backoff step in seconds; retry n waits n times this
    #[arg(long)]
    pub backoff: Option<f64>,

    /// Query parameter used as the page cursor
    #[arg(long)]
    pub cursor_key: Option<String>,

    /// Response field holding the records
    #[arg(long)]
    pub content_key: Option<String>,

    /// Output directory
    #[arg(short, long, default_value = "output")]
    pub output: PathBuf,

    /// Also write flattened rows (rows.jsonl)
    #[arg(long)]
    pub flatten: bool,

    /// Array field to explode into one row per element, repeatable
    #[arg(long)]
    pub explode: Vec<String>,

    /// Normalize column names of flattened rows to snake_case
    #[arg(long)]
    pub normalize: bool,
}

impl ExtractArgs {
    /// Whether flattened rows should be produced
    pub fn wants_rows(&self) -> bool {
        self.flatten || self.normalize || !self.explode.is_empty()
    }
}

/// Parse a `key=value` pair
pub fn parse_param(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))?;

    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty parameter name in '{raw}'"));
    }

    Ok((key.to_string(), value.to_string()))
}
