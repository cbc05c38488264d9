//! Engine types
//!
//! Configuration, outcome and statistics for the extraction loop.

use crate::pagination::PageToken;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;

/// Configuration for one extraction run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopConfig {
    /// Run name used in logs
    pub name: String,
    /// Maximum number of fetch cycles
    pub max_iterations: u32,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            name: "scrape".to_string(),
            max_iterations: 1000,
        }
    }
}

impl LoopConfig {
    /// Create a new loop config
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the run name
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the iteration bound
    #[must_use]
    pub fn with_max_iterations(mut self, max: u32) -> Self {
        self.max_iterations = max;
        self
    }
}

/// Why a run stopped
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Termination {
    /// The last page carried a "not found" marker
    PageNotFound,
    /// The "next" control was inactive, or the source had no next position
    PaginationDisabled,
    /// The content measurement did not change after the last advance
    UnchangedContent,
    /// The source never signalled an end within the bound
    IterationBoundExceeded {
        /// Configured bound
        bound: u32,
    },
    /// A fetch failed; the token can be retried
    SourceUnavailable {
        /// Token whose fetch failed
        token: PageToken,
        /// Error description
        message: String,
    },
    /// Aborted by the caller
    Cancelled,
}

impl Termination {
    /// The source signalled its own end
    pub fn is_exhausted(&self) -> bool {
        matches!(
            self,
            Self::PageNotFound | Self::PaginationDisabled | Self::UnchangedContent
        )
    }

    /// The run gave up rather than finishing
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Self::IterationBoundExceeded { .. } | Self::SourceUnavailable { .. }
        )
    }
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PageNotFound => write!(f, "page not found"),
            Self::PaginationDisabled => write!(f, "pagination disabled"),
            Self::UnchangedContent => write!(f, "content unchanged"),
            Self::IterationBoundExceeded { bound } => {
                write!(f, "iteration bound of {bound} exceeded")
            }
            Self::SourceUnavailable { token, message } => {
                write!(f, "source unavailable at {token}: {message}")
            }
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Statistics from one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoopStats {
    /// Fetch cycles started
    pub iterations: u32,
    /// Pages successfully fetched
    pub pages_fetched: usize,
    /// Candidate records extracted, duplicates included
    pub candidates: usize,
    /// Records kept after deduplication
    pub records_kept: usize,
    /// Candidates dropped as duplicates
    pub duplicates_dropped: usize,
    /// Pages that produced no candidates
    pub empty_pages: usize,
    /// Pages the extractor could not read
    pub extraction_mismatches: usize,
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// Wall time in milliseconds
    pub duration_ms: u64,
}

impl Default for LoopStats {
    fn default() -> Self {
        Self {
            iterations: 0,
            pages_fetched: 0,
            candidates: 0,
            records_kept: 0,
            duplicates_dropped: 0,
            empty_pages: 0,
            extraction_mismatches: 0,
            started_at: Utc::now(),
            duration_ms: 0,
        }
    }
}

/// Result of a run: the records collected so far and why it stopped
#[derive(Debug, Clone)]
pub struct LoopOutcome<R> {
    /// Deduplicated records in order of first encounter
    pub records: Vec<R>,
    /// Stop reason
    pub termination: Termination,
    /// Run statistics
    pub stats: LoopStats,
    pub(crate) next_token: Option<PageToken>,
    pub(crate) last_fingerprint: Option<u64>,
}

impl<R> LoopOutcome<R> {
    /// Token to continue from, for unavailable and cancelled runs
    pub fn next_token(&self) -> Option<&PageToken> {
        self.next_token.as_ref()
    }

    /// Whether the run can be resumed
    pub fn is_resumable(&self) -> bool {
        self.next_token.is_some()
    }
}

/// Ordered, deduplicated record set
#[derive(Debug, Clone)]
pub struct Accumulator<R, K> {
    records: Vec<R>,
    seen: HashSet<K>,
}

impl<R, K: Eq + Hash> Default for Accumulator<R, K> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            seen: HashSet::new(),
        }
    }
}

impl<R, K: Eq + Hash> Accumulator<R, K> {
    /// Create an empty accumulator
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record unless its key was already seen.
    ///
    /// Returns `true` when the record was kept.
    pub fn push(&mut self, key: K, record: R) -> bool {
        if !self.seen.insert(key) {
            return false;
        }
        self.records.push(record);
        true
    }

    /// Whether a key was seen
    pub fn contains(&self, key: &K) -> bool {
        self.seen.contains(key)
    }

    /// Number of records kept
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no record was kept
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records kept so far
    pub fn records(&self) -> &[R] {
        &self.records
    }

    /// Consume into the record list
    pub fn into_records(self) -> Vec<R> {
        self.records
    }
}
