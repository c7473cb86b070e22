//! CLI module
//!
//! Command-line interface for running extractions.
//!
//! # Commands
//!
//! - `extract` - Fetch every page of an endpoint and write the results
//! - `normalize` - Print normalized column names

mod commands;
mod runner;

pub use commands::{parse_param, Cli, Commands, ExtractArgs};
pub use runner::{build_config, tabulate, Runner, EXIT_ABORTED};
