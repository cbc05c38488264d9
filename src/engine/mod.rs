//! Extraction loop module
//!
//! Drives fetch/extract cycles against a page source and collects
//! deduplicated records.
//!
//! # Overview
//!
//! The engine module provides:
//! - `ExtractionLoop` - The sequential fetch, extract, dedup, advance loop
//! - `LoopConfig` - Run name and iteration bound
//! - `LoopOutcome` - Records plus the explicit reason the run stopped
//! - `run_concurrently` - Independent runs with bounded concurrency
//!
//! Every exit path returns the records gathered so far. Fetch failures are
//! reported as [`Termination::SourceUnavailable`] with the failing token,
//! never retried here; a run stopped that way (or cancelled) can be
//! continued with [`ExtractionLoop::resume`].

mod types;

pub use types::{Accumulator, LoopConfig, LoopOutcome, LoopStats, Termination};

use crate::error::{Error, Result};
use crate::extract::{FieldExtractor, IdentityKey};
use crate::pagination::{PageToken, TerminationState};
use crate::source::PageSource;
use futures::stream::{self, StreamExt};
use std::future::Future;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Sequential paginated extraction loop
#[derive(Debug, Clone, Default)]
pub struct ExtractionLoop {
    config: LoopConfig,
}

/// State carried between iterations (and across a resume)
struct RunState<R, K> {
    records: Accumulator<R, K>,
    stats: LoopStats,
    last_fingerprint: Option<u64>,
}

impl ExtractionLoop {
    /// Create a new loop
    pub fn new(config: LoopConfig) -> Self {
        Self { config }
    }

    /// Get the loop configuration
    pub fn config(&self) -> &LoopConfig {
        &self.config
    }

    /// Run the loop from `initial` until a termination condition fires
    pub async fn run<R, S, E, I>(
        &self,
        initial: PageToken,
        source: &mut S,
        extractor: &E,
        identity: &I,
        cancel: &CancellationToken,
    ) -> LoopOutcome<R>
    where
        S: PageSource + ?Sized,
        E: FieldExtractor<R> + ?Sized,
        I: IdentityKey<R> + ?Sized,
    {
        info!("Starting {} at {}", self.config.name, initial);

        let state = RunState {
            records: Accumulator::new(),
            stats: LoopStats::default(),
            last_fingerprint: None,
        };
        self.drive(initial, state, source, extractor, identity, cancel)
            .await
    }

    /// Continue an unavailable or cancelled run from its next token.
    ///
    /// Records already collected are kept and stay deduplicated against new
    /// pages; the iteration bound covers both parts of the run.
    pub async fn resume<R, S, E, I>(
        &self,
        outcome: LoopOutcome<R>,
        source: &mut S,
        extractor: &E,
        identity: &I,
        cancel: &CancellationToken,
    ) -> Result<LoopOutcome<R>>
    where
        S: PageSource + ?Sized,
        E: FieldExtractor<R> + ?Sized,
        I: IdentityKey<R> + ?Sized,
    {
        let Some(token) = outcome.next_token else {
            return Err(Error::config(format!(
                "cannot resume {}: run ended with {}",
                self.config.name, outcome.termination
            )));
        };

        let mut records = Accumulator::new();
        for record in outcome.records {
            let key = identity.key(&record);
            records.push(key, record);
        }

        info!(
            "Resuming {} at {} with {} records",
            self.config.name,
            token,
            records.len()
        );

        let state = RunState {
            records,
            stats: outcome.stats,
            last_fingerprint: outcome.last_fingerprint,
        };
        Ok(self
            .drive(token, state, source, extractor, identity, cancel)
            .await)
    }

    async fn drive<R, S, E, I>(
        &self,
        mut token: PageToken,
        state: RunState<R, I::Key>,
        source: &mut S,
        extractor: &E,
        identity: &I,
        cancel: &CancellationToken,
    ) -> LoopOutcome<R>
    where
        S: PageSource + ?Sized,
        E: FieldExtractor<R> + ?Sized,
        I: IdentityKey<R> + ?Sized,
    {
        let started = Instant::now();
        let RunState {
            mut records,
            mut stats,
            mut last_fingerprint,
        } = state;
        let bound = self.config.max_iterations;

        let (termination, next_token) = loop {
            if cancel.is_cancelled() {
                break (Termination::Cancelled, Some(token));
            }
            if stats.iterations >= bound {
                break (Termination::IterationBoundExceeded { bound }, None);
            }
            stats.iterations += 1;

            let page = match source.fetch(&token).await {
                Ok(page) => page,
                Err(e) => {
                    warn!(
                        "{}: fetch of {} failed (retryable: {}): {}",
                        self.config.name,
                        token,
                        e.is_retryable(),
                        e
                    );
                    let termination = Termination::SourceUnavailable {
                        token: token.clone(),
                        message: e.to_string(),
                    };
                    break (termination, Some(token));
                }
            };
            stats.pages_fetched += 1;

            let candidates = match extractor.extract(&page) {
                Ok(candidates) => candidates,
                Err(e) => {
                    warn!("{}: could not extract {}: {}", self.config.name, token, e);
                    stats.extraction_mismatches += 1;
                    Vec::new()
                }
            };

            if candidates.is_empty() {
                stats.empty_pages += 1;
            }
            stats.candidates += candidates.len();

            let before = records.len();
            for record in candidates {
                let key = identity.key(&record);
                if !records.push(key, record) {
                    stats.duplicates_dropped += 1;
                }
            }
            debug!(
                "{}: {} gave {} new records ({} total)",
                self.config.name,
                token,
                records.len() - before,
                records.len()
            );

            let verdict = TerminationState::from_signal(&page.signal, last_fingerprint);
            last_fingerprint = page.signal.fingerprint;

            match verdict {
                TerminationState::Continue => {}
                TerminationState::StopPageNotFound => break (Termination::PageNotFound, None),
                TerminationState::StopPaginationDisabled => {
                    break (Termination::PaginationDisabled, None)
                }
                TerminationState::StopUnchangedContent => {
                    break (Termination::UnchangedContent, None)
                }
            }

            match token.advance(&page.signal) {
                Some(next) => token = next,
                None => break (Termination::PaginationDisabled, None),
            }
        };

        stats.records_kept = records.len();
        #[allow(clippy::cast_possible_truncation)]
        let elapsed = started.elapsed().as_millis() as u64;
        stats.duration_ms = stats.duration_ms.saturating_add(elapsed);

        info!(
            "Finished {}: {} records in {} pages ({})",
            self.config.name, stats.records_kept, stats.pages_fetched, termination
        );

        LoopOutcome {
            records: records.into_records(),
            termination,
            stats,
            next_token,
            last_fingerprint,
        }
    }
}

/// Drive independent runs with at most `limit` in flight.
///
/// Results come back in input order.
pub async fn run_concurrently<I, F, T>(runs: I, limit: usize) -> Vec<T>
where
    I: IntoIterator<Item = F>,
    F: Future<Output = T>,
{
    stream::iter(runs).buffered(limit.max(1)).collect().await
}
