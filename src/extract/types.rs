//! Extraction types and traits

use crate::error::Result;
use crate::source::RawPage;
use crate::types::JsonObject;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::hash::Hash;

/// A structured item extracted from a page
pub type Record = JsonObject;

/// Turns one raw page into zero or more candidate records
///
/// Pure with respect to the page. An `Err` means the page did not have
/// the expected shape; the loop counts it as a mismatch and moves on.
pub trait FieldExtractor<R = Record>: Send + Sync {
    /// Extract candidate records, in page order
    fn extract(&self, page: &RawPage) -> Result<Vec<R>>;
}

impl<R, F> FieldExtractor<R> for F
where
    F: Fn(&RawPage) -> Result<Vec<R>> + Send + Sync,
{
    fn extract(&self, page: &RawPage) -> Result<Vec<R>> {
        self(page)
    }
}

/// Maps a record to the key used for deduplication
///
/// Must be deterministic: equal records map to equal keys.
pub trait IdentityKey<R>: Send + Sync {
    /// Key type
    type Key: Eq + Hash + Send;

    /// Compute the key of a record
    fn key(&self, record: &R) -> Self::Key;
}

impl<R, K, F> IdentityKey<R> for F
where
    F: Fn(&R) -> K + Send + Sync,
    K: Eq + Hash + Send,
{
    type Key = K;

    fn key(&self, record: &R) -> K {
        self(record)
    }
}

/// Declarative identity for JSON records
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RecordIdentity {
    /// One field (e.g. a link or an id)
    Field {
        /// Field name
        name: String,
    },
    /// Several fields combined
    Fields {
        /// Field names, in key order
        names: Vec<String>,
    },
    /// The whole record
    #[default]
    Whole,
}

impl RecordIdentity {
    /// Identity by one field
    pub fn field(name: impl Into<String>) -> Self {
        Self::Field { name: name.into() }
    }

    /// Identity by several fields
    pub fn fields<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Fields {
            names: names.into_iter().map(Into::into).collect(),
        }
    }
}

const KEY_SEPARATOR: char = '\u{1f}';

impl IdentityKey<Record> for RecordIdentity {
    type Key = String;

    fn key(&self, record: &Record) -> String {
        let names: &[String] = match self {
            Self::Whole => return whole_key(record),
            Self::Field { name } => std::slice::from_ref(name),
            Self::Fields { names } => names,
        };

        let mut parts = Vec::with_capacity(names.len());
        for name in names {
            match record.get(name) {
                Some(value) if !value.is_null() => parts.push(key_part(value)),
                // records missing an identity field are only equal when identical
                _ => return whole_key(record),
            }
        }
        parts.join(&KEY_SEPARATOR.to_string())
    }
}

fn key_part(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn whole_key(record: &Record) -> String {
    Value::Object(record.clone()).to_string()
}

/// One output field of a CSS extractor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Output field name
    pub name: String,
    /// Selector relative to the item; the item itself when absent
    #[serde(default)]
    pub selector: Option<String>,
    /// Read this attribute instead of the text
    #[serde(default)]
    pub attr: Option<String>,
    /// Read inner HTML instead of the text
    #[serde(default)]
    pub html: bool,
    /// Collect every match into an array
    #[serde(default)]
    pub multiple: bool,
    /// Regex applied to the value; capture group 1 when present
    #[serde(default)]
    pub pattern: Option<String>,
    /// Resolve the value as a URL against the page URL
    #[serde(default)]
    pub absolute: bool,
    /// A missing value makes the page a mismatch
    #[serde(default)]
    pub required: bool,
}

impl FieldSpec {
    /// Field holding the text of `selector`
    pub fn text(name: impl Into<String>, selector: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            selector: Some(selector.into()),
            attr: None,
            html: false,
            multiple: false,
            pattern: None,
            absolute: false,
            required: false,
        }
    }

    /// Field holding an attribute of `selector`
    pub fn attr(
        name: impl Into<String>,
        selector: impl Into<String>,
        attr: impl Into<String>,
    ) -> Self {
        Self {
            attr: Some(attr.into()),
            ..Self::text(name, selector)
        }
    }

    /// Collect all matches
    #[must_use]
    pub fn multiple(mut self) -> Self {
        self.multiple = true;
        self
    }

    /// Post-process with a regex
    #[must_use]
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    /// Resolve as an absolute URL
    #[must_use]
    pub fn absolute(mut self) -> Self {
        self.absolute = true;
        self
    }

    /// Mark as required
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}
