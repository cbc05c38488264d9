//! Template interpolation for scrape jobs
//!
//! Handles `{{ variable }}` interpolation in job URLs, query values, and
//! headers. Supports nested access like `{{ vars.query }}` and
//! `{{ page.number }}`; bare names resolve against `vars`.

use crate::error::{Error, Result};
use regex::{Captures, Regex};
use serde_json::Value;
use std::sync::LazyLock;

/// Regex for matching template variables: {{ variable.path }}
static TEMPLATE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([a-zA-Z_][a-zA-Z0-9_]*(?:\.[a-zA-Z_][a-zA-Z0-9_]*)*)\s*\}\}")
        .expect("template regex is valid")
});

/// Context for template interpolation
#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    /// Job variables
    pub vars: Value,
    /// Current page position (`number`, `offset`, `cursor`)
    pub page: Value,
}

impl TemplateContext {
    /// Create a new empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Create context with job variables
    pub fn with_vars(vars: Value) -> Self {
        Self {
            vars,
            ..Default::default()
        }
    }

    /// Set page position values
    pub fn set_page(&mut self, page: Value) -> &mut Self {
        self.page = page;
        self
    }

    /// Get a value by path (e.g., "vars.query")
    pub fn get(&self, path: &str) -> Option<&Value> {
        let parts: Vec<&str> = path.split('.').collect();

        let root = match parts[0] {
            "vars" => &self.vars,
            "page" => &self.page,
            _ => return get_nested_value(&self.vars, &parts),
        };

        if parts.len() == 1 {
            Some(root)
        } else {
            get_nested_value(root, &parts[1..])
        }
    }
}

/// Get a nested value from a JSON value by path
fn get_nested_value<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut current = value;
    for part in path {
        match current {
            Value::Object(map) => {
                current = map.get(*part)?;
            }
            _ => return None,
        }
    }
    Some(current)
}

/// Render a template string with the given context
///
/// Substituted values are inserted verbatim and never re-expanded.
pub fn render(template: &str, ctx: &TemplateContext) -> Result<String> {
    // anything left over did not match the placeholder grammar
    if TEMPLATE_REGEX.replace_all(template, "").contains("{{") {
        return Err(Error::template(format!(
            "malformed placeholder in '{template}'"
        )));
    }

    let mut errors = Vec::new();
    let result = TEMPLATE_REGEX.replace_all(template, |cap: &Captures<'_>| match ctx.get(&cap[1]) {
        Some(value) => value_to_string(value),
        None => {
            errors.push(cap[1].to_string());
            String::new()
        }
    });

    if !errors.is_empty() {
        return Err(Error::undefined_var(errors.join(", ")));
    }

    Ok(result.into_owned())
}

/// Extract all variable names from a template
pub fn extract_variables(template: &str) -> Vec<String> {
    TEMPLATE_REGEX
        .captures_iter(template)
        .map(|cap| cap[1].to_string())
        .collect()
}

/// Convert a JSON value to a string for template substitution
fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
