//! YAML parser for scrape job definitions
//!
//! Parses and validates job YAML files.

use super::builder::build_extractor;
use crate::error::{Error, Result};
use crate::loader::types::{JobDefinition, PaginationDefinition};
use crate::template::{self, TemplateContext};
use std::fs;
use std::path::Path;

/// Load a job definition from a YAML file
///
/// ```ignore
/// let job = load_job("./jobs/journal.yaml")?;
/// let mut runnable = job.build(&JsonObject::new())?;
/// ```
pub fn load_job(path: impl AsRef<Path>) -> Result<JobDefinition> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::FileNotFound {
                path: path.display().to_string(),
            }
        } else {
            Error::config(format!(
                "Failed to read job file '{}': {}",
                path.display(),
                e
            ))
        }
    })?;
    load_job_from_str(&content)
}

/// Load a job definition from a YAML string
pub fn load_job_from_str(yaml: &str) -> Result<JobDefinition> {
    let def: JobDefinition = serde_yaml::from_str(yaml)
        .map_err(|e| Error::config(format!("Failed to parse job YAML: {e}")))?;

    validate_job(&def)?;
    Ok(def)
}

/// Validate a job definition
fn validate_job(def: &JobDefinition) -> Result<()> {
    if def.name.trim().is_empty() {
        return Err(Error::config("Job name cannot be empty"));
    }

    if def.url.trim().is_empty() {
        return Err(Error::config(format!("Job '{}' url cannot be empty", def.name)));
    }

    if def.limits.max_iterations == 0 {
        return Err(Error::invalid_value(
            "limits.max_iterations",
            "must be greater than zero",
        ));
    }

    match &def.pagination {
        PaginationDefinition::Offset { step: 0, .. } => {
            return Err(Error::invalid_value(
                "pagination.step",
                "must be greater than zero",
            ));
        }
        PaginationDefinition::Cursor { .. } if def.signals.next_cursor.is_none() => {
            return Err(Error::config(format!(
                "Job '{}' uses cursor pagination but has no signals.next_cursor",
                def.name
            )));
        }
        PaginationDefinition::Path { template, .. } if template.trim().is_empty() => {
            return Err(Error::missing_field("pagination.template"));
        }
        PaginationDefinition::Path { template: tmpl, .. }
            if !template::extract_variables(tmpl)
                .iter()
                .any(|v| v.starts_with("page.")) =>
        {
            return Err(Error::invalid_value(
                "pagination.template",
                "must reference the page position (e.g. {{ page.number }})",
            ));
        }
        _ => {}
    }

    // selectors and patterns must compile
    def.signals.compile()?;
    let ctx = TemplateContext::with_vars(serde_json::Value::Object(def.vars.clone()));
    build_extractor(&def.extractor, &ctx)?;

    Ok(())
}
