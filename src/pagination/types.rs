//! Pagination types and traits
//!
//! Defines the position token, the continuation signal carried by every
//! fetched page, and the termination state derived from it.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Position in a paginated or incrementally loading source
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PageToken {
    /// Page number (usually starts at 1 or 2)
    Page {
        /// Current page number
        number: u32,
    },
    /// Record offset with a fixed step (e.g. `?start=10`)
    Offset {
        /// Current offset
        offset: u32,
        /// Amount added per page
        step: u32,
    },
    /// Opaque cursor handed out by the previous page
    Cursor {
        /// Cursor value, `None` for the first page
        cursor: Option<String>,
    },
    /// Scroll position of an infinitely scrolling view
    Scroll {
        /// Last observed content height, `None` before the first advance
        height: Option<u64>,
    },
}

impl PageToken {
    /// Create a page number token
    pub fn page(number: u32) -> Self {
        Self::Page { number }
    }

    /// Create an offset token
    pub fn offset(offset: u32, step: u32) -> Self {
        Self::Offset { offset, step }
    }

    /// Create a cursor token
    pub fn cursor(cursor: impl Into<String>) -> Self {
        Self::Cursor {
            cursor: Some(cursor.into()),
        }
    }

    /// Create the token for the first page of a cursor source
    pub fn first_cursor() -> Self {
        Self::Cursor { cursor: None }
    }

    /// Create the token for a scroll source that has not moved yet
    pub fn scroll_start() -> Self {
        Self::Scroll { height: None }
    }

    /// Compute the token following this one.
    ///
    /// Returns `None` when the source cannot advance any further: the page
    /// number or offset would overflow, or a cursor page carried no next
    /// cursor.
    pub fn advance(&self, signal: &ContinuationSignal) -> Option<Self> {
        match self {
            Self::Page { number } => number.checked_add(1).map(Self::page),
            Self::Offset { offset, step } => offset
                .checked_add(*step)
                .map(|next| Self::offset(next, *step)),
            Self::Cursor { .. } => signal
                .next_cursor
                .as_ref()
                .filter(|c| !c.is_empty())
                .map(|c| Self::cursor(c.clone())),
            Self::Scroll { height } => Some(Self::Scroll {
                height: signal.fingerprint.or(*height),
            }),
        }
    }

    /// Page number, if this is a page token
    pub fn page_number(&self) -> Option<u32> {
        match self {
            Self::Page { number } => Some(*number),
            _ => None,
        }
    }

    /// Offset, if this is an offset token
    pub fn offset_value(&self) -> Option<u32> {
        match self {
            Self::Offset { offset, .. } => Some(*offset),
            _ => None,
        }
    }

    /// Cursor, if this is a cursor token past the first page
    pub fn cursor_value(&self) -> Option<&str> {
        match self {
            Self::Cursor { cursor } => cursor.as_deref(),
            _ => None,
        }
    }
}

impl fmt::Display for PageToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Page { number } => write!(f, "page {number}"),
            Self::Offset { offset, step } => write!(f, "offset {offset} (+{step})"),
            Self::Cursor { cursor: None } => write!(f, "cursor <start>"),
            Self::Cursor { cursor: Some(c) } => write!(f, "cursor {c}"),
            Self::Scroll { height: None } => write!(f, "scroll <start>"),
            Self::Scroll { height: Some(h) } => write!(f, "scroll @{h}"),
        }
    }
}

/// Continuation markers and measurements taken from one fetched page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContinuationSignal {
    /// The page carried an explicit "not found" marker
    pub not_found: bool,
    /// The "next" control was explicitly marked inactive
    pub pagination_disabled: bool,
    /// Content measurement (scroll height, row count, body length)
    pub fingerprint: Option<u64>,
    /// Cursor for the following page, for cursor sources
    pub next_cursor: Option<String>,
}

impl ContinuationSignal {
    /// Create an empty signal (continue, nothing measured)
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal for a page that does not exist
    pub fn page_not_found() -> Self {
        Self {
            not_found: true,
            ..Default::default()
        }
    }

    /// Signal for the last page of a source
    pub fn last_page() -> Self {
        Self {
            pagination_disabled: true,
            ..Default::default()
        }
    }

    /// Set the content fingerprint
    #[must_use]
    pub fn with_fingerprint(mut self, fingerprint: u64) -> Self {
        self.fingerprint = Some(fingerprint);
        self
    }

    /// Set the next cursor
    #[must_use]
    pub fn with_next_cursor(mut self, cursor: impl Into<String>) -> Self {
        self.next_cursor = Some(cursor.into());
        self
    }

    /// Mark pagination as disabled
    #[must_use]
    pub fn with_pagination_disabled(mut self) -> Self {
        self.pagination_disabled = true;
        self
    }
}

/// Whether the loop should fetch another page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationState {
    /// Fetch the next page
    Continue,
    /// The page carried a "not found" marker
    StopPageNotFound,
    /// The "next" control is inactive
    StopPaginationDisabled,
    /// Content measurement did not change since the previous page
    StopUnchangedContent,
}

impl TerminationState {
    /// Derive the state from a page's signal.
    ///
    /// Precedence: not found, then pagination disabled, then unchanged
    /// content. Unchanged content needs a fingerprint on both the previous
    /// and the current page.
    pub fn from_signal(signal: &ContinuationSignal, previous_fingerprint: Option<u64>) -> Self {
        if signal.not_found {
            return Self::StopPageNotFound;
        }
        if signal.pagination_disabled {
            return Self::StopPaginationDisabled;
        }
        match (previous_fingerprint, signal.fingerprint) {
            (Some(previous), Some(current)) if previous == current => Self::StopUnchangedContent,
            _ => Self::Continue,
        }
    }
}

/// A concrete request for one page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageRequest {
    /// URL to fetch
    pub url: String,
    /// Query parameters to add
    pub query: HashMap<String, String>,
}

impl PageRequest {
    /// Create a request for a URL with no extra parameters
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            query: HashMap::new(),
        }
    }

    /// Add a query parameter
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }
}

/// Maps page tokens onto requests for request/response sources
pub trait Paginator: Send + Sync {
    /// Token for the first page
    fn initial_token(&self) -> PageToken;

    /// Build the request for the given token
    fn request(&self, base_url: &str, token: &PageToken) -> Result<PageRequest>;

    /// Whether the source only ever has one page
    fn is_single_page(&self) -> bool {
        false
    }
}
