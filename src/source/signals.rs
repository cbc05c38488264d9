//! Continuation signal detection
//!
//! Turns a fetched body into a [`ContinuationSignal`] using declarative
//! rules: markers for "not found" and "pagination disabled", a locator for
//! the next cursor, and a content fingerprint.

use crate::error::{Error, Result};
use crate::extract::lookup_path;
use crate::pagination::ContinuationSignal;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A marker looked for in a fetched page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Marker {
    /// An element matching the selector exists
    Css { selector: String },
    /// No element matches the selector
    CssAbsent { selector: String },
    /// The JSON body has a non-null value at the path
    JsonPath { path: String },
    /// The JSON body has no value (or null) at the path
    JsonPathAbsent { path: String },
    /// The body contains the literal text
    Text { value: String },
}

impl Marker {
    /// Marker matching when a CSS selector matches
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css {
            selector: selector.into(),
        }
    }

    /// Marker matching when a CSS selector matches nothing
    pub fn css_absent(selector: impl Into<String>) -> Self {
        Self::CssAbsent {
            selector: selector.into(),
        }
    }

    /// Marker matching when a JSON path holds a value
    pub fn json_path(path: impl Into<String>) -> Self {
        Self::JsonPath { path: path.into() }
    }

    /// Marker matching when a JSON path holds nothing
    pub fn json_path_absent(path: impl Into<String>) -> Self {
        Self::JsonPathAbsent { path: path.into() }
    }

    /// Marker matching literal text
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text {
            value: value.into(),
        }
    }
}

/// Where the next cursor lives in a page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CursorLocator {
    /// String or number at a JSON path
    JsonPath { path: String },
    /// Attribute of the first element matching a selector
    CssAttr { selector: String, attr: String },
}

/// How a page's content is measured
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Fingerprint {
    /// No measurement
    #[default]
    None,
    /// Body length in bytes
    BodyLength,
    /// Number of elements matching a selector (e.g. loaded rows)
    CssCount { selector: String },
    /// Number at a JSON path, or length of the array there
    JsonPath { path: String },
}

/// Declarative continuation rules for a source
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalRules {
    /// Any of these markers means the page does not exist
    pub not_found: Vec<Marker>,
    /// Any of these markers means there is no next page
    pub pagination_disabled: Vec<Marker>,
    /// HTTP statuses reported as "not found" instead of failing the fetch
    pub not_found_statuses: Vec<u16>,
    /// Where to read the next cursor from
    pub next_cursor: Option<CursorLocator>,
    /// Content measurement
    pub fingerprint: Fingerprint,
}

impl SignalRules {
    /// Create empty rules
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a "not found" marker
    #[must_use]
    pub fn not_found(mut self, marker: Marker) -> Self {
        self.not_found.push(marker);
        self
    }

    /// Add a "pagination disabled" marker
    #[must_use]
    pub fn pagination_disabled(mut self, marker: Marker) -> Self {
        self.pagination_disabled.push(marker);
        self
    }

    /// Report an HTTP status as "not found"
    #[must_use]
    pub fn not_found_status(mut self, status: u16) -> Self {
        self.not_found_statuses.push(status);
        self
    }

    /// Set the next cursor locator
    #[must_use]
    pub fn next_cursor(mut self, locator: CursorLocator) -> Self {
        self.next_cursor = Some(locator);
        self
    }

    /// Set the fingerprint mode
    #[must_use]
    pub fn fingerprint(mut self, fingerprint: Fingerprint) -> Self {
        self.fingerprint = fingerprint;
        self
    }

    /// Compile the rules, parsing every selector once
    pub fn compile(&self) -> Result<SignalDetector> {
        let not_found = self
            .not_found
            .iter()
            .map(CompiledMarker::compile)
            .collect::<Result<Vec<_>>>()?;
        let pagination_disabled = self
            .pagination_disabled
            .iter()
            .map(CompiledMarker::compile)
            .collect::<Result<Vec<_>>>()?;

        let next_cursor = match &self.next_cursor {
            None => None,
            Some(CursorLocator::JsonPath { path }) => Some(CompiledCursor::Json(path.clone())),
            Some(CursorLocator::CssAttr { selector, attr }) => Some(CompiledCursor::CssAttr {
                selector: parse_selector(selector)?,
                attr: attr.clone(),
            }),
        };

        let fingerprint = match &self.fingerprint {
            Fingerprint::None => CompiledFingerprint::None,
            Fingerprint::BodyLength => CompiledFingerprint::BodyLength,
            Fingerprint::CssCount { selector } => {
                CompiledFingerprint::CssCount(parse_selector(selector)?)
            }
            Fingerprint::JsonPath { path } => CompiledFingerprint::Json(path.clone()),
        };

        Ok(SignalDetector {
            not_found,
            pagination_disabled,
            not_found_statuses: self.not_found_statuses.clone(),
            next_cursor,
            fingerprint,
        })
    }
}

/// Parse a CSS selector into a crate error on failure
pub(crate) fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| Error::selector(selector, format!("{e:?}")))
}

#[derive(Debug, Clone)]
enum CompiledMarker {
    Css(Selector),
    CssAbsent(Selector),
    Json(String),
    JsonAbsent(String),
    Text(String),
}

impl CompiledMarker {
    fn compile(marker: &Marker) -> Result<Self> {
        Ok(match marker {
            Marker::Css { selector } => Self::Css(parse_selector(selector)?),
            Marker::CssAbsent { selector } => Self::CssAbsent(parse_selector(selector)?),
            Marker::JsonPath { path } => Self::Json(path.clone()),
            Marker::JsonPathAbsent { path } => Self::JsonAbsent(path.clone()),
            Marker::Text { value } => Self::Text(value.clone()),
        })
    }

    fn needs_html(&self) -> bool {
        matches!(self, Self::Css(_) | Self::CssAbsent(_))
    }

    fn needs_json(&self) -> bool {
        matches!(self, Self::Json(_) | Self::JsonAbsent(_))
    }

    fn matches(&self, body: &ParsedBody<'_>) -> bool {
        match self {
            Self::Css(selector) => body
                .html
                .as_ref()
                .is_some_and(|doc| doc.select(selector).next().is_some()),
            Self::CssAbsent(selector) => body
                .html
                .as_ref()
                .is_some_and(|doc| doc.select(selector).next().is_none()),
            // JSON markers only apply to bodies that parsed as JSON
            Self::Json(path) => body
                .json
                .as_ref()
                .is_some_and(|json| has_value(json, path)),
            Self::JsonAbsent(path) => body
                .json
                .as_ref()
                .is_some_and(|json| !has_value(json, path)),
            Self::Text(value) => body.raw.contains(value.as_str()),
        }
    }
}

#[derive(Debug, Clone)]
enum CompiledCursor {
    Json(String),
    CssAttr { selector: Selector, attr: String },
}

#[derive(Debug, Clone)]
enum CompiledFingerprint {
    None,
    BodyLength,
    CssCount(Selector),
    Json(String),
}

/// Compiled continuation rules, ready to evaluate pages
#[derive(Debug, Clone)]
pub struct SignalDetector {
    not_found: Vec<CompiledMarker>,
    pagination_disabled: Vec<CompiledMarker>,
    not_found_statuses: Vec<u16>,
    next_cursor: Option<CompiledCursor>,
    fingerprint: CompiledFingerprint,
}

impl Default for SignalDetector {
    fn default() -> Self {
        Self {
            not_found: Vec::new(),
            pagination_disabled: Vec::new(),
            not_found_statuses: Vec::new(),
            next_cursor: None,
            fingerprint: CompiledFingerprint::None,
        }
    }
}

struct ParsedBody<'a> {
    raw: &'a str,
    html: Option<Html>,
    json: Option<Value>,
}

impl SignalDetector {
    /// Whether an HTTP status should be read as "page not found"
    pub fn is_not_found_status(&self, status: u16) -> bool {
        self.not_found_statuses.contains(&status)
    }

    /// Evaluate a page body
    pub fn evaluate(&self, body: &str) -> ContinuationSignal {
        let parsed = self.parse(body);

        ContinuationSignal {
            not_found: self.not_found.iter().any(|m| m.matches(&parsed)),
            pagination_disabled: self.pagination_disabled.iter().any(|m| m.matches(&parsed)),
            fingerprint: self.measure(&parsed),
            next_cursor: self.locate_cursor(&parsed),
        }
    }

    fn parse<'a>(&self, body: &'a str) -> ParsedBody<'a> {
        let markers = self.not_found.iter().chain(&self.pagination_disabled);
        let mut needs_html = false;
        let mut needs_json = false;
        for marker in markers {
            needs_html |= marker.needs_html();
            needs_json |= marker.needs_json();
        }
        match &self.next_cursor {
            Some(CompiledCursor::Json(_)) => needs_json = true,
            Some(CompiledCursor::CssAttr { .. }) => needs_html = true,
            None => {}
        }
        match &self.fingerprint {
            CompiledFingerprint::Json(_) => needs_json = true,
            CompiledFingerprint::CssCount(_) => needs_html = true,
            _ => {}
        }

        ParsedBody {
            raw: body,
            html: needs_html.then(|| Html::parse_document(body)),
            json: if needs_json {
                serde_json::from_str(body).ok()
            } else {
                None
            },
        }
    }

    fn measure(&self, body: &ParsedBody<'_>) -> Option<u64> {
        match &self.fingerprint {
            CompiledFingerprint::None => None,
            CompiledFingerprint::BodyLength => Some(body.raw.len() as u64),
            CompiledFingerprint::CssCount(selector) => body
                .html
                .as_ref()
                .map(|doc| doc.select(selector).count() as u64),
            CompiledFingerprint::Json(path) => {
                body.json
                    .as_ref()
                    .and_then(|json| lookup_path(json, path))
                    .and_then(|value| match value {
                        Value::Number(n) => n.as_u64(),
                        Value::Array(items) => Some(items.len() as u64),
                        Value::String(s) => s.trim().parse().ok(),
                        _ => None,
                    })
            }
        }
    }

    fn locate_cursor(&self, body: &ParsedBody<'_>) -> Option<String> {
        let cursor = match self.next_cursor.as_ref()? {
            CompiledCursor::Json(path) => {
                match lookup_path(body.json.as_ref()?, path)? {
                    Value::String(s) => s,
                    Value::Number(n) => n.to_string(),
                    _ => return None,
                }
            }
            CompiledCursor::CssAttr { selector, attr } => body
                .html
                .as_ref()?
                .select(selector)
                .next()?
                .value()
                .attr(attr)?
                .to_string(),
        };
        (!cursor.is_empty()).then_some(cursor)
    }
}

fn has_value(json: &Value, path: &str) -> bool {
    lookup_path(json, path).is_some_and(|v| !v.is_null())
}
