//! Page source types and traits

use crate::error::Result;
use crate::pagination::{ContinuationSignal, PageToken};
use async_trait::async_trait;

/// The fetched or rendered content for one token
#[derive(Debug, Clone)]
pub struct RawPage {
    /// Token the page was fetched for
    pub token: PageToken,
    /// URL the content came from, if any
    pub url: Option<String>,
    /// HTTP status, for request/response sources
    pub status: Option<u16>,
    /// HTML, rendered DOM snapshot, or API response body
    pub body: String,
    /// Continuation markers taken from the content
    pub signal: ContinuationSignal,
}

impl RawPage {
    /// Create a page with an empty signal
    pub fn new(token: PageToken, body: impl Into<String>) -> Self {
        Self {
            token,
            url: None,
            status: None,
            body: body.into(),
            signal: ContinuationSignal::default(),
        }
    }

    /// Set the source URL
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Set the HTTP status
    #[must_use]
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Set the continuation signal
    #[must_use]
    pub fn with_signal(mut self, signal: ContinuationSignal) -> Self {
        self.signal = signal;
        self
    }
}

/// Yields raw pages for tokens
///
/// Request/response sources fetch the page the token names. Scroll-style
/// sources track their own position and advance on every call.
/// Retry policy belongs here, not in the extraction loop.
#[async_trait]
pub trait PageSource: Send {
    /// Fetch (or advance to) the page for `token`
    async fn fetch(&mut self, token: &PageToken) -> Result<RawPage>;
}
