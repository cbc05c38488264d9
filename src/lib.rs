//! # scrapeloop
//!
//! A paginated scrape-and-extract engine. A job fetches pages from a source,
//! extracts records from each page, drops duplicates, and stops on the first
//! signal that says there is nothing more to read.
//!
//! ## Features
//!
//! - **Page sources**: HTTP pages driven by a paginator, or infinite-scroll drivers
//! - **Pagination**: page number, offset, cursor and path templates
//! - **Continuation signals**: not-found and end-of-pagination markers, content fingerprints
//! - **Extraction**: CSS selectors, named regex groups, JSON paths
//! - **Dedup**: records keyed by a field, a set of fields, or the whole record
//! - **Resumable runs**: interrupted or failed runs carry their next token
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use scrapeloop::{load_job, Result};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let mut job = load_job("jobs/journal.yaml")?.build(&Default::default())?;
//!
//!     let outcome = job.run(&CancellationToken::new()).await;
//!     println!("{} records, stopped: {}", outcome.records.len(), outcome.termination);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                       Extraction Loop                           │
//! │  fetch(token) → extract → dedupe → terminate? → advance(token)  │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//! ┌───────────┬──────────────┬───┴──────────┬──────────────────────┐
//! │  Source   │   Paginate   │   Signals    │      Extract         │
//! ├───────────┼──────────────┼──────────────┼──────────────────────┤
//! │ HTTP      │ Page Number  │ Not Found    │ CSS                  │
//! │ Scroll    │ Offset       │ Last Page    │ Regex                │
//! │           │ Cursor, Path │ Fingerprint  │ JSON Path            │
//! └───────────┴──────────────┴──────────────┴──────────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// HTTP client with retry and rate limiting
pub mod http;

/// Pagination strategies and continuation signals
pub mod pagination;

/// Page sources (HTTP, infinite scroll)
pub mod source;

/// Record extraction and identity
pub mod extract;

/// The extraction loop
pub mod engine;

/// YAML loader for job definitions
pub mod loader;

/// Template interpolation
pub mod template;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use engine::{ExtractionLoop, LoopConfig, LoopOutcome, Termination};
pub use extract::{FieldExtractor, IdentityKey, Record, RecordIdentity};
pub use loader::{load_job, load_job_from_str, JobDefinition, ScrapeJob};
pub use pagination::{ContinuationSignal, PageToken, Paginator, TerminationState};
pub use source::{PageSource, RawPage};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
