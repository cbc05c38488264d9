//! Extractor implementations
//!
//! Each extractor handles one kind of page content.

use super::paths::{lookup_path, select_records};
use super::types::{FieldExtractor, FieldSpec, Record};
use crate::error::{Error, Result};
use crate::source::{parse_selector, RawPage};
use crate::types::OptionStringExt;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde_json::{Map, Value};
use url::Url;

// ============================================================================
// CSS Extractor
// ============================================================================

/// Extracts one record per element matching an item selector
///
/// ```ignore
/// let extractor = CssExtractor::new(
///     ".search-result",
///     vec![
///         FieldSpec::text("title", "h3"),
///         FieldSpec::attr("link", "a", "href").absolute().required(),
///     ],
/// )?;
/// ```
#[derive(Debug, Clone)]
pub struct CssExtractor {
    item: Selector,
    fields: Vec<CompiledField>,
    base_url: Option<Url>,
}

#[derive(Debug, Clone)]
struct CompiledField {
    name: String,
    selector: Option<Selector>,
    attr: Option<String>,
    html: bool,
    multiple: bool,
    pattern: Option<Regex>,
    absolute: bool,
    required: bool,
}

impl CompiledField {
    fn compile(spec: &FieldSpec) -> Result<Self> {
        Ok(Self {
            name: spec.name.clone(),
            selector: spec.selector.as_deref().map(parse_selector).transpose()?,
            attr: spec.attr.clone(),
            html: spec.html,
            multiple: spec.multiple,
            pattern: spec.pattern.as_deref().map(Regex::new).transpose()?,
            absolute: spec.absolute,
            required: spec.required,
        })
    }

    fn read(&self, item: ElementRef<'_>, base: Option<&Url>) -> Value {
        let elements: Vec<ElementRef<'_>> = match &self.selector {
            Some(selector) => item.select(selector).collect(),
            None => vec![item],
        };

        let mut values = elements
            .into_iter()
            .filter_map(|el| self.read_element(el, base));

        if self.multiple {
            Value::Array(values.map(Value::String).collect())
        } else {
            values.next().map_or(Value::Null, Value::String)
        }
    }

    fn read_element(&self, el: ElementRef<'_>, base: Option<&Url>) -> Option<String> {
        let raw = if let Some(attr) = &self.attr {
            el.value().attr(attr)?.trim().to_string()
        } else if self.html {
            el.inner_html().trim().to_string()
        } else {
            normalize_text(el.text())
        };

        let value = match &self.pattern {
            Some(re) => {
                let caps = re.captures(&raw)?;
                caps.get(1).or_else(|| caps.get(0))?.as_str().to_string()
            }
            None => raw,
        };

        let value = if self.absolute {
            match base.and_then(|b| b.join(&value).ok()) {
                Some(url) => url.to_string(),
                None => value,
            }
        } else {
            value
        };

        value.none_if_blank()
    }
}

impl CssExtractor {
    /// Create an extractor, compiling every selector and pattern
    pub fn new(item_selector: &str, fields: Vec<FieldSpec>) -> Result<Self> {
        if fields.is_empty() {
            return Err(Error::config(format!(
                "CSS extractor for '{item_selector}' has no fields"
            )));
        }

        Ok(Self {
            item: parse_selector(item_selector)?,
            fields: fields
                .iter()
                .map(CompiledField::compile)
                .collect::<Result<Vec<_>>>()?,
            base_url: None,
        })
    }

    /// URL used to resolve relative links when the page has none
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self> {
        self.base_url = Some(Url::parse(base_url)?);
        Ok(self)
    }
}

impl FieldExtractor for CssExtractor {
    fn extract(&self, page: &RawPage) -> Result<Vec<Record>> {
        let document = Html::parse_document(&page.body);
        let page_url = page.url.as_deref().and_then(|u| Url::parse(u).ok());
        let base = page_url.as_ref().or(self.base_url.as_ref());

        let mut records = Vec::new();
        for (index, item) in document.select(&self.item).enumerate() {
            let mut record = Map::new();
            for field in &self.fields {
                let value = field.read(item, base);
                if field.required && is_missing(&value) {
                    return Err(Error::mismatch(format!(
                        "required field '{}' missing from item {} on {}",
                        field.name, index, page.token
                    )));
                }
                record.insert(field.name.clone(), value);
            }
            records.push(record);
        }
        Ok(records)
    }
}

fn normalize_text<'a>(parts: impl Iterator<Item = &'a str>) -> String {
    parts
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_missing(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

// ============================================================================
// Regex Extractor
// ============================================================================

/// One record per regex match, fields taken from named capture groups
#[derive(Debug, Clone)]
pub struct RegexExtractor {
    pattern: Regex,
    names: Vec<String>,
}

impl RegexExtractor {
    /// Create an extractor; the pattern must have named groups
    pub fn new(pattern: &str) -> Result<Self> {
        let pattern = Regex::new(pattern)?;
        let names: Vec<String> = pattern
            .capture_names()
            .flatten()
            .map(str::to_string)
            .collect();

        if names.is_empty() {
            return Err(Error::invalid_value(
                "pattern",
                "regex extractor needs at least one named group",
            ));
        }

        Ok(Self { pattern, names })
    }
}

impl FieldExtractor for RegexExtractor {
    fn extract(&self, page: &RawPage) -> Result<Vec<Record>> {
        Ok(self
            .pattern
            .captures_iter(&page.body)
            .map(|caps| {
                self.names
                    .iter()
                    .map(|name| {
                        let value = caps
                            .name(name)
                            .map(|m| m.as_str().trim().to_string())
                            .and_then(|s| s.none_if_blank())
                            .map_or(Value::Null, Value::String);
                        (name.clone(), value)
                    })
                    .collect()
            })
            .collect())
    }
}

// ============================================================================
// JSON Extractor
// ============================================================================

/// Extracts records from JSON API responses
///
/// `record_path` selects the records; optional field paths project each
/// record onto named fields.
#[derive(Debug, Clone, Default)]
pub struct JsonExtractor {
    record_path: Option<String>,
    fields: Vec<(String, String)>,
}

impl JsonExtractor {
    /// Create an extractor; without a path the whole body is the record set
    pub fn new(record_path: Option<String>) -> Self {
        Self {
            record_path,
            fields: Vec::new(),
        }
    }

    /// Project a field from each record
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, path: impl Into<String>) -> Self {
        self.fields.push((name.into(), path.into()));
        self
    }

    fn project(&self, value: Value) -> Record {
        if self.fields.is_empty() {
            return match value {
                Value::Object(map) => map,
                other => {
                    let mut map = Map::new();
                    map.insert("value".to_string(), other);
                    map
                }
            };
        }

        self.fields
            .iter()
            .map(|(name, path)| {
                (
                    name.clone(),
                    lookup_path(&value, path).unwrap_or(Value::Null),
                )
            })
            .collect()
    }
}

impl FieldExtractor for JsonExtractor {
    fn extract(&self, page: &RawPage) -> Result<Vec<Record>> {
        let value: Value = serde_json::from_str(&page.body).map_err(|e| {
            Error::mismatch(format!("{} is not valid JSON: {e}", page.token))
        })?;

        Ok(select_records(&value, self.record_path.as_deref())?
            .into_iter()
            .map(|v| self.project(v))
            .collect())
    }
}
