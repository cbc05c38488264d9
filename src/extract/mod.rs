//! Record extraction
//!
//! Supports: CSS selectors over HTML, regex named groups, JSON paths
//!
//! # Overview
//!
//! A [`FieldExtractor`] turns one [`RawPage`](crate::source::RawPage) into
//! candidate records. An [`IdentityKey`] maps each record to the key the
//! extraction loop deduplicates on. Both traits are implemented for plain
//! closures, so typed records work as well as JSON ones.

mod extractors;
mod paths;
mod types;

pub use extractors::{CssExtractor, JsonExtractor, RegexExtractor};
pub use paths::{lookup_path, select_records};
pub use types::{FieldExtractor, FieldSpec, IdentityKey, Record, RecordIdentity};

#[cfg(test)]
mod tests;
