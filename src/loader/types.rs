//! Loader types
//!
//! Declarative scrape job definition types for YAML parsing.

use crate::extract::{FieldSpec, RecordIdentity};
use crate::source::SignalRules;
use crate::types::{BackoffType, JsonObject, StringMap};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// Job Definition
// ============================================================================

/// Top-level scrape job definition
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct JobDefinition {
    /// Job name
    pub name: String,
    /// Start URL (can contain templates)
    pub url: String,
    /// Template variables, available as `{{ vars.name }}`
    #[serde(default)]
    pub vars: JsonObject,
    /// Query parameters sent with every page (values can contain templates)
    #[serde(default)]
    pub query: StringMap,
    /// Headers sent with every page (values can contain templates)
    #[serde(default)]
    pub headers: StringMap,
    /// How the page position is encoded in requests
    #[serde(default)]
    pub pagination: PaginationDefinition,
    /// Continuation markers
    #[serde(default)]
    pub signals: SignalRules,
    /// How records are read from pages
    pub extractor: ExtractorDefinition,
    /// Deduplication key
    #[serde(default)]
    pub identity: RecordIdentity,
    /// Run limits
    #[serde(default)]
    pub limits: LimitsDefinition,
    /// HTTP client configuration
    #[serde(default)]
    pub http: HttpDefinition,
}

// ============================================================================
// Pagination Definition
// ============================================================================

/// Pagination configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PaginationDefinition {
    /// Page number in a query parameter
    PageNumber {
        /// Query parameter name
        #[serde(default = "default_page_param")]
        param: String,
        /// First page
        #[serde(default = "default_start_page")]
        start: u32,
        /// Page size parameter name
        #[serde(default)]
        page_size_param: Option<String>,
        /// Page size
        #[serde(default)]
        page_size: Option<u32>,
    },
    /// Record offset in a query parameter
    Offset {
        /// Query parameter name
        #[serde(default = "default_offset_param")]
        param: String,
        /// First offset
        #[serde(default)]
        start: u32,
        /// Offset increment per page
        #[serde(default = "default_step")]
        step: u32,
        /// Limit parameter name (sent with `step`)
        #[serde(default)]
        limit_param: Option<String>,
    },
    /// Cursor handed out by the previous page
    Cursor {
        /// Query parameter name
        #[serde(default = "default_cursor_param")]
        param: String,
    },
    /// Page number inside the URL path
    Path {
        /// URL or path template using `{{ page.number }}`
        template: String,
        /// First page
        #[serde(default = "default_start_page")]
        start: u32,
    },
    /// Single page
    #[default]
    None,
}

fn default_page_param() -> String {
    "page".to_string()
}

fn default_offset_param() -> String {
    "start".to_string()
}

fn default_cursor_param() -> String {
    "cursor".to_string()
}

fn default_start_page() -> u32 {
    1
}

fn default_step() -> u32 {
    10
}

// ============================================================================
// Extractor Definition
// ============================================================================

/// Record extractor configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExtractorDefinition {
    /// CSS selectors over HTML
    Css {
        /// Selector matching one element per record
        item: String,
        /// Output fields
        fields: Vec<FieldSpec>,
        /// Base URL for relative links (defaults to the page URL)
        #[serde(default)]
        base_url: Option<String>,
    },
    /// Regex with named groups
    Regex {
        /// Pattern; each named group becomes a field
        pattern: String,
    },
    /// JSON API responses
    Json {
        /// Path to the records array
        #[serde(default)]
        records: Option<String>,
        /// Field name to path projections
        #[serde(default)]
        fields: BTreeMap<String, String>,
    },
}

// ============================================================================
// Limits / HTTP Definitions
// ============================================================================

/// Run limits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LimitsDefinition {
    /// Maximum fetch cycles
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,
}

impl Default for LimitsDefinition {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
        }
    }
}

fn default_max_iterations() -> u32 {
    1000
}

/// HTTP client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct HttpDefinition {
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Maximum retries per page
    #[serde(default = "default_retries")]
    pub max_retries: u32,
    /// Backoff between retries
    #[serde(default)]
    pub backoff: BackoffType,
    /// Initial backoff in milliseconds
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
    /// Requests per second; `0` disables rate limiting
    #[serde(default)]
    pub requests_per_second: Option<u32>,
    /// Burst size for the rate limiter
    #[serde(default)]
    pub burst: Option<u32>,
    /// User agent
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for HttpDefinition {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            max_retries: default_retries(),
            backoff: BackoffType::default(),
            initial_backoff_ms: default_initial_backoff_ms(),
            requests_per_second: None,
            burst: None,
            user_agent: None,
        }
    }
}

fn default_timeout() -> u64 {
    30
}

fn default_retries() -> u32 {
    3
}

fn default_initial_backoff_ms() -> u64 {
    250
}
