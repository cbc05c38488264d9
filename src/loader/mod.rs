//! YAML Loader module
//!
//! Parse scrape job definitions from YAML files.
//!
//! # Overview
//!
//! The loader module provides:
//! - `JobDefinition` - Declarative job description
//! - `ScrapeJob` - A built job, ready to run
//! - YAML parsing with validation
//!
//! # Example
//!
//! ```yaml
//! name: journal-publications
//! url: "https://www.example.net/journal/{{ vars.journal }}/publications"
//! vars:
//!   journal: Journal-of-Things
//! pagination:
//!   type: page_number
//!   param: page
//!   start: 1
//! signals:
//!   not_found:
//!     - type: css
//!       selector: .headline
//!   pagination_disabled:
//!     - type: css
//!       selector: .pagination__next.is-disabled
//! extractor:
//!   type: css
//!   item: .publication
//!   fields:
//!     - name: title
//!       selector: .title
//!     - name: link
//!       selector: .title a
//!       attr: href
//!       absolute: true
//! identity:
//!   type: field
//!   name: link
//! ```

mod builder;
mod parser;
mod types;

pub use builder::ScrapeJob;
pub use parser::{load_job, load_job_from_str};
pub use types::{
    ExtractorDefinition, HttpDefinition, JobDefinition, LimitsDefinition, PaginationDefinition,
};
