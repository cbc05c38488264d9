//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::engine::LoopOutcome;
use crate::error::{Error, Result, ResultExt};
use crate::extract::Record;
use crate::loader::{load_job, JobDefinition};
use crate::types::{JsonObject, JsonValue};
use serde_json::json;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Run {
                vars,
                output,
                max_iterations,
            } => self.run_job(vars, output.as_deref(), *max_iterations).await,
            Commands::Validate => self.validate(),
        }
    }

    /// Load job definition
    fn load_job(&self) -> Result<JobDefinition> {
        let path = self
            .cli
            .job
            .as_ref()
            .ok_or_else(|| Error::config("Job file not specified (use -j flag)"))?;
        load_job(path)
    }

    /// Run the job, write records, then report how it stopped
    async fn run_job(
        &self,
        vars: &[String],
        output: Option<&Path>,
        max_iterations: Option<u32>,
    ) -> Result<()> {
        let def = self.load_job()?;
        let overrides = vars
            .iter()
            .map(|v| parse_var(v))
            .collect::<Result<JsonObject>>()?;

        let mut job = def.build(&overrides)?;
        if let Some(max) = max_iterations {
            if max == 0 {
                return Err(Error::invalid_value(
                    "max_iterations",
                    "must be greater than zero",
                ));
            }
            job.config.max_iterations = max;
        }

        let cancel = CancellationToken::new();
        let interrupt = tokio::spawn({
            let cancel = cancel.clone();
            async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("Interrupted, stopping after the current page");
                    cancel.cancel();
                }
            }
        });

        let outcome = job.run(&cancel).await;
        interrupt.abort();

        match output {
            Some(path) => {
                let file = File::create(path)
                    .with_context(|| format!("Failed to create '{}'", path.display()))?;
                write_records(&outcome.records, self.cli.format, BufWriter::new(file))?;
                info!("Wrote {} records to {}", outcome.records.len(), path.display());
            }
            None => write_records(&outcome.records, self.cli.format, io::stdout().lock())?,
        }

        eprintln!("{}", summary(&job.name, &outcome));

        if outcome.termination.is_failure() {
            return Err(Error::Other(format!(
                "{} stopped early: {}",
                job.name, outcome.termination
            )));
        }
        Ok(())
    }

    /// Validate job definition
    fn validate(&self) -> Result<()> {
        let def = self.load_job()?;
        let job = def.build(&JsonObject::new())?;

        self.output_message(&json!({
            "status": "valid",
            "name": job.name,
            "url": job.source.base_url(),
            "initial_token": job.initial_token,
            "max_iterations": job.config.max_iterations,
        }));
        Ok(())
    }

    fn output_message(&self, msg: &JsonValue) {
        match self.cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(msg).unwrap_or_default());
            }
            OutputFormat::Pretty => {
                println!("{}", serde_json::to_string_pretty(msg).unwrap_or_default());
            }
        }
    }
}

/// Parse a `key=value` variable override
pub fn parse_var(s: &str) -> Result<(String, JsonValue)> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| Error::invalid_value("var", format!("expected KEY=VALUE, got '{s}'")))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(Error::invalid_value("var", format!("empty key in '{s}'")));
    }
    Ok((key.to_string(), JsonValue::String(value.to_string())))
}

/// Write records as JSON lines or a pretty JSON array
fn write_records<W: Write>(records: &[Record], format: OutputFormat, mut writer: W) -> Result<()> {
    match format {
        OutputFormat::Json => {
            for record in records {
                serde_json::to_writer(&mut writer, record)?;
                writeln!(writer)?;
            }
        }
        OutputFormat::Pretty => {
            serde_json::to_writer_pretty(&mut writer, records)?;
            writeln!(writer)?;
        }
    }
    writer.flush()?;
    Ok(())
}

fn summary(name: &str, outcome: &LoopOutcome<Record>) -> JsonValue {
    json!({
        "job": name,
        "termination": outcome.termination,
        "next_token": outcome.next_token(),
        "stats": outcome.stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn record(value: JsonValue) -> Record {
        match value {
            JsonValue::Object(map) => map,
            other => panic!("not an object: {other}"),
        }
    }

    #[test]
    fn test_parse_var() {
        assert_eq!(
            parse_var("journal=Journal-of-Things").unwrap(),
            ("journal".to_string(), json!("Journal-of-Things"))
        );
        assert_eq!(
            parse_var("q=a=b").unwrap(),
            ("q".to_string(), json!("a=b"))
        );
        assert!(parse_var("novalue").is_err());
        assert!(parse_var("=x").is_err());
    }

    #[test]
    fn test_write_records_json_lines() {
        let records = vec![record(json!({"id": 1})), record(json!({"id": 2}))];
        let mut out = Vec::new();
        write_records(&records, OutputFormat::Json, &mut out).unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "{\"id\":1}\n{\"id\":2}\n");
    }

    #[test]
    fn test_write_records_pretty() {
        let records = vec![record(json!({"id": 1}))];
        let mut out = Vec::new();
        write_records(&records, OutputFormat::Pretty, &mut out).unwrap();

        let parsed: JsonValue = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed, json!([{"id": 1}]));
    }

    #[test]
    fn test_write_records_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.jsonl");
        let file = File::create(&path).unwrap();

        write_records(&[record(json!({"a": "b"}))], OutputFormat::Json, BufWriter::new(file))
            .unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{\"a\":\"b\"}\n");
    }
}
