//! Scroll-driven page source
//!
//! Infinitely scrolling views have no page URLs: every fetch scrolls the
//! view to the bottom, waits for new content to settle, and snapshots the
//! rendered document. The content height is the fingerprint, so the loop
//! stops once a scroll no longer grows the view.

use super::signals::SignalDetector;
use super::types::{PageSource, RawPage};
use crate::error::Result;
use crate::pagination::PageToken;
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// Drives a rendered, scrollable view
///
/// Implemented over whatever automation backend renders the page.
#[async_trait]
pub trait ScrollDriver: Send {
    /// Scroll the view to its current end
    async fn scroll_to_end(&mut self) -> Result<()>;

    /// Current content height
    async fn content_height(&mut self) -> Result<u64>;

    /// Serialized snapshot of the rendered document
    async fn snapshot(&mut self) -> Result<String>;

    /// URL of the rendered view, if known
    fn current_url(&self) -> Option<String> {
        None
    }
}

/// Page source backed by a [`ScrollDriver`]
pub struct ScrollPageSource<D> {
    driver: D,
    detector: SignalDetector,
    settle: Duration,
}

impl<D: ScrollDriver> ScrollPageSource<D> {
    /// Create a source that waits one second after each scroll
    pub fn new(driver: D) -> Self {
        Self {
            driver,
            detector: SignalDetector::default(),
            settle: Duration::from_secs(1),
        }
    }

    /// Set the detector for markers in the rendered document
    #[must_use]
    pub fn with_detector(mut self, detector: SignalDetector) -> Self {
        self.detector = detector;
        self
    }

    /// Set the wait after each scroll
    #[must_use]
    pub fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    /// Consume the source and return the driver
    pub fn into_driver(self) -> D {
        self.driver
    }
}

#[async_trait]
impl<D: ScrollDriver> PageSource for ScrollPageSource<D> {
    async fn fetch(&mut self, token: &PageToken) -> Result<RawPage> {
        self.driver.scroll_to_end().await?;
        if !self.settle.is_zero() {
            tokio::time::sleep(self.settle).await;
        }

        let height = self.driver.content_height().await?;
        let body = self.driver.snapshot().await?;
        debug!("Scrolled {} to height {}", token, height);

        let mut signal = self.detector.evaluate(&body);
        signal.fingerprint = Some(height);

        let mut page = RawPage::new(token.clone(), body).with_signal(signal);
        if let Some(url) = self.driver.current_url() {
            page = page.with_url(url);
        }
        Ok(page)
    }
}
