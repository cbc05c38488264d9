//! JSON path lookup
//!
//! Plain dot paths (`data.items[0].id`, `items[-1]`) are walked directly;
//! anything using wildcards, recursive descent or filters goes through
//! `jsonpath-rust`.

use crate::error::{Error, Result};
use serde_json::Value;

/// Look up a single value by path.
///
/// Returns `None` when the path does not resolve. Wildcard paths resolve
/// to the array of their matches.
pub fn lookup_path(value: &Value, path: &str) -> Option<Value> {
    if needs_jsonpath(path) {
        return match query_jsonpath(value, path).ok()? {
            matches if matches.is_empty() => None,
            matches => Some(Value::Array(matches)),
        };
    }
    walk_path(value, path).cloned()
}

/// Select the records a path points at.
///
/// An array yields its elements, any other value yields itself, and a
/// missing path yields nothing. Without a path the whole document is used.
pub fn select_records(value: &Value, path: Option<&str>) -> Result<Vec<Value>> {
    let Some(path) = path else {
        return Ok(flatten(value.clone()));
    };

    if needs_jsonpath(path) {
        return query_jsonpath(value, path);
    }

    Ok(walk_path(value, path).cloned().map(flatten).unwrap_or_default())
}

fn flatten(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        Value::Null => Vec::new(),
        other => vec![other],
    }
}

fn needs_jsonpath(path: &str) -> bool {
    path.contains('*') || path.contains("..") || path.contains('?')
}

fn query_jsonpath(value: &Value, path: &str) -> Result<Vec<Value>> {
    use jsonpath_rust::JsonPath;

    let jp = JsonPath::try_from(path)
        .map_err(|e| Error::json_path(format!("Invalid JSONPath '{path}': {e}")))?;

    match jp.find(value) {
        Value::Array(items) => Ok(items),
        Value::Null => Ok(Vec::new()),
        other => Ok(vec![other]),
    }
}

fn walk_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let path = path.trim();
    let path = path
        .strip_prefix("$.")
        .or_else(|| path.strip_prefix('$'))
        .unwrap_or(path);
    if path.is_empty() {
        return Some(value);
    }

    let mut current = value;
    for part in path.split('.') {
        let (name, indexes) = match part.find('[') {
            Some(pos) => (&part[..pos], &part[pos..]),
            None => (part, ""),
        };

        if !name.is_empty() {
            current = current.get(name)?;
        }

        // one or more `[n]` suffixes
        for index in indexes.split('[').filter(|s| !s.is_empty()) {
            let index: i64 = index.strip_suffix(']')?.trim().parse().ok()?;
            let items = current.as_array()?;
            let idx = if index < 0 {
                items.len().checked_sub(usize::try_from(index.unsigned_abs()).ok()?)?
            } else {
                usize::try_from(index).ok()?
            };
            current = items.get(idx)?;
        }
    }
    Some(current)
}
