//! CLI module
//!
//! Command-line interface for running scrape jobs.
//!
//! # Commands
//!
//! - `run` - Run a job and write its records
//! - `validate` - Load and build a job without fetching

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::{parse_var, Runner};
