//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Paginated scrape-and-extract runner
#[derive(Parser, Debug)]
#[command(name = "scrapeloop")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Scrape job definition file (YAML)
    #[arg(short, long, global = true)]
    pub job: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the job and write the extracted records
    Run {
        /// Override a job variable (key=value, repeatable)
        #[arg(long = "var", value_name = "KEY=VALUE")]
        vars: Vec<String>,

        /// Write records to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Override the iteration bound
        #[arg(long)]
        max_iterations: Option<u32>,
    },

    /// Validate the job definition without fetching
    Validate,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// One JSON record per line
    Json,
    /// Pretty-printed JSON array
    Pretty,
}
