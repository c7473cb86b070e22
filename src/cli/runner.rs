//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, ExtractArgs};
use crate::config::{read_config, ExtractorConfig};
use crate::error::{Error, Result};
use crate::extract::ExtractionController;
use crate::normalize::{
    explode_field, flatten_records, normalize_column_name, normalize_columns, DEFAULT_SEPARATOR,
};
use crate::output::{write_json_pretty, write_jsonl, RunReport};
use crate::types::{JsonObject, JsonValue};
use chrono::Utc;
use serde_json::Value;
use tracing::info;

/// Exit code for a run that stopped before the API was exhausted
pub const EXIT_ABORTED: i32 = 2;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command, returning the process exit code
    pub async fn run(&self) -> Result<i32> {
        match &self.cli.command {
            Commands::Extract(args) => self.extract(args).await,
            Commands::Normalize { names } => {
                for name in names {
                    println!("{name}\t{}", normalize_column_name(name));
                }
                Ok(0)
            }
        }
    }

    async fn extract(&self, args: &ExtractArgs) -> Result<i32> {
        let config = build_config(args)?;
        let base_url = config.base_url.clone();

        let started_at = Utc::now();
        let result = ExtractionController::from_config(config)?.run().await;
        let finished_at = Utc::now();

        let out = &args.output;
        write_jsonl(out.join("records.jsonl"), &result.records)?;
        write_jsonl(out.join("metadata.jsonl"), &result.metadata)?;

        let mut report = RunReport::new(base_url, &result, started_at, finished_at);

        if args.wants_rows() {
            let rows = tabulate(&result.records, &args.explode, args.normalize);
            write_jsonl(out.join("rows.jsonl"), &rows)?;
            report = report.with_rows(rows.len());
        }

        write_json_pretty(out.join("report.json"), &report)?;

        info!(
            output = %out.display(),
            records = report.records,
            metadata_pages = report.metadata_pages,
            "Wrote extraction results"
        );

        Ok(if result.is_complete() { 0 } else { EXIT_ABORTED })
    }
}

/// Build the extractor config from a file and/or command-line overrides
pub fn build_config(args: &ExtractArgs) -> Result<ExtractorConfig> {
    let mut config = match (&args.config, &args.url) {
        (Some(path), url) => {
            let mut config = read_config(path)?;
            if let Some(url) = url {
                config.base_url.clone_from(url);
            }
            config
        }
        (None, Some(url)) => ExtractorConfig::new(url.clone()),
        (None, None) => return Err(Error::config("either --config or --url is required")),
    };

    for (key, value) in &args.params {
        config
            .initial_params
            .insert(key.clone(), Value::String(value.clone()));
    }
    if let Some(max_attempts) = args.max_attempts {
        config.max_attempts = max_attempts;
    }
    if let Some(delay) = args.delay {
        config.inter_request_delay_seconds = delay;
    }
    if let Some(backoff) = args.backoff {
        config.backoff_base_seconds = backoff;
    }
    if let Some(key) = &args.cursor_key {
        config.cursor_key.clone_from(key);
    }
    if let Some(key) = &args.content_key {
        config.content_key.clone_from(key);
    }

    config.validate()?;
    Ok(config)
}

/// Flatten records into rows, exploding the given fields in order
pub fn tabulate(records: &[JsonValue], explode: &[String], normalize: bool) -> Vec<JsonObject> {
    let mut rows = flatten_records(records, DEFAULT_SEPARATOR);
    for field in explode {
        rows = explode_field(&rows, field, DEFAULT_SEPARATOR);
    }

    if normalize {
        normalize_columns(rows)
    } else {
        rows
    }
}
