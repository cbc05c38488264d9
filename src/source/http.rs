//! Request/response page source

use super::signals::SignalDetector;
use super::types::{PageSource, RawPage};
use crate::error::{Error, Result};
use crate::http::{HttpClient, RequestConfig};
use crate::pagination::{ContinuationSignal, PageToken, Paginator};
use async_trait::async_trait;
use std::collections::HashMap;
use tracing::debug;

/// Fetches one page per token over HTTP
///
/// The paginator maps the token onto a URL and query parameters; the
/// detector turns the response body into a continuation signal.
pub struct HttpPageSource {
    client: HttpClient,
    base_url: String,
    paginator: Box<dyn Paginator>,
    detector: SignalDetector,
    query: HashMap<String, String>,
    headers: HashMap<String, String>,
}

impl HttpPageSource {
    /// Create a new source
    pub fn new(
        client: HttpClient,
        base_url: impl Into<String>,
        paginator: Box<dyn Paginator>,
        detector: SignalDetector,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            paginator,
            detector,
            query: HashMap::new(),
            headers: HashMap::new(),
        }
    }

    /// Add a query parameter sent with every page
    #[must_use]
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Add a header sent with every page
    #[must_use]
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Token for the first page
    pub fn initial_token(&self) -> PageToken {
        self.paginator.initial_token()
    }

    /// Base URL pages are resolved against
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request_config(&self, page_query: HashMap<String, String>) -> RequestConfig {
        let mut config = RequestConfig::new();
        config.query.extend(self.query.clone());
        // paginator parameters win over static ones
        config.query.extend(page_query);
        config.headers.extend(self.headers.clone());
        config
    }
}

#[async_trait]
impl PageSource for HttpPageSource {
    async fn fetch(&mut self, token: &PageToken) -> Result<RawPage> {
        let request = self.paginator.request(&self.base_url, token)?;
        let config = self.request_config(request.query);

        debug!("Fetching {} ({})", request.url, token);

        let fetched = match self.client.fetch_text(&request.url, config).await {
            Ok(fetched) => fetched,
            Err(Error::HttpStatus { status, body })
                if self.detector.is_not_found_status(status) =>
            {
                debug!("Status {} read as page not found for {}", status, token);
                return Ok(RawPage::new(token.clone(), body)
                    .with_url(request.url)
                    .with_status(status)
                    .with_signal(ContinuationSignal::page_not_found()));
            }
            Err(e) => return Err(e),
        };

        let mut signal = self.detector.evaluate(&fetched.body);
        if self.paginator.is_single_page() {
            signal.pagination_disabled = true;
        }

        Ok(RawPage::new(token.clone(), fetched.body)
            .with_url(fetched.url)
            .with_status(fetched.status)
            .with_signal(signal))
    }
}

impl std::fmt::Debug for HttpPageSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpPageSource")
            .field("base_url", &self.base_url)
            .field("detector", &self.detector)
            .field("query", &self.query)
            .finish_non_exhaustive()
    }
}
