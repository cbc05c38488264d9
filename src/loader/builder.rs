//! Turns job definitions into runnable jobs

use super::types::{ExtractorDefinition, HttpDefinition, JobDefinition, PaginationDefinition};
use crate::engine::{ExtractionLoop, LoopConfig, LoopOutcome};
use crate::error::Result;
use crate::extract::{
    CssExtractor, FieldExtractor, JsonExtractor, Record, RecordIdentity, RegexExtractor,
};
use crate::http::{HttpClient, HttpClientConfig, RateLimiterConfig};
use crate::pagination::{
    CursorPaginator, NoPaginator, OffsetPaginator, PageNumberPaginator, PageToken, Paginator,
    PathPaginator,
};
use crate::source::HttpPageSource;
use crate::template::{self, TemplateContext};
use crate::types::JsonObject;
use serde_json::Value;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;

/// A job ready to run: source, extractor and identity wired together
pub struct ScrapeJob {
    /// Job name
    pub name: String,
    /// Page source
    pub source: HttpPageSource,
    /// Record extractor
    pub extractor: Box<dyn FieldExtractor>,
    /// Deduplication key
    pub identity: RecordIdentity,
    /// Loop configuration
    pub config: LoopConfig,
    /// Token of the first page
    pub initial_token: PageToken,
}

impl ScrapeJob {
    /// Run the job from its first page
    pub async fn run(&mut self, cancel: &CancellationToken) -> LoopOutcome<Record> {
        ExtractionLoop::new(self.config.clone())
            .run(
                self.initial_token.clone(),
                &mut self.source,
                &*self.extractor,
                &self.identity,
                cancel,
            )
            .await
    }

    /// Continue an unavailable or cancelled run
    pub async fn resume(
        &mut self,
        outcome: LoopOutcome<Record>,
        cancel: &CancellationToken,
    ) -> Result<LoopOutcome<Record>> {
        ExtractionLoop::new(self.config.clone())
            .resume(
                outcome,
                &mut self.source,
                &*self.extractor,
                &self.identity,
                cancel,
            )
            .await
    }
}

impl std::fmt::Debug for ScrapeJob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScrapeJob")
            .field("name", &self.name)
            .field("source", &self.source)
            .field("identity", &self.identity)
            .field("config", &self.config)
            .field("initial_token", &self.initial_token)
            .finish_non_exhaustive()
    }
}

impl JobDefinition {
    /// Build a runnable job; `overrides` replace entries of `vars`
    pub fn build(&self, overrides: &JsonObject) -> Result<ScrapeJob> {
        let mut vars = self.vars.clone();
        vars.extend(overrides.clone());
        let vars = Value::Object(vars);
        let ctx = TemplateContext::with_vars(vars.clone());

        let url = template::render(&self.url, &ctx)?;
        Url::parse(&url)?;

        let client = HttpClient::with_config(build_http_config(&self.http))?;
        let paginator = build_paginator(&self.pagination, vars);
        // surface template errors in path pagination now, not on the first fetch
        paginator.request(&url, &paginator.initial_token())?;
        let detector = self.signals.compile()?;

        let mut source = HttpPageSource::new(client, url, paginator, detector);
        for (key, value) in &self.query {
            let rendered = template::render(value, &ctx)?;
            if !rendered.is_empty() {
                source = source.with_query(key, rendered);
            }
        }
        for (key, value) in &self.headers {
            source = source.with_header(key, template::render(value, &ctx)?);
        }

        let initial_token = source.initial_token();
        Ok(ScrapeJob {
            name: self.name.clone(),
            source,
            extractor: build_extractor(&self.extractor, &ctx)?,
            identity: self.identity.clone(),
            config: LoopConfig::new()
                .with_name(&self.name)
                .with_max_iterations(self.limits.max_iterations),
            initial_token,
        })
    }
}

/// Build the HTTP client config for a job
pub(crate) fn build_http_config(def: &HttpDefinition) -> HttpClientConfig {
    let mut builder = HttpClientConfig::builder()
        .timeout(Duration::from_secs(def.timeout_secs))
        .max_retries(def.max_retries)
        .backoff(
            def.backoff,
            Duration::from_millis(def.initial_backoff_ms),
            Duration::from_secs(30),
        );

    match def.requests_per_second {
        Some(0) => builder = builder.no_rate_limit(),
        Some(rps) => {
            builder = builder.rate_limit(RateLimiterConfig::new(rps, def.burst.unwrap_or(1)));
        }
        None => {}
    }

    if let Some(ua) = &def.user_agent {
        builder = builder.user_agent(ua);
    }

    builder.build()
}

/// Build the paginator for a job
pub(crate) fn build_paginator(def: &PaginationDefinition, vars: Value) -> Box<dyn Paginator> {
    match def {
        PaginationDefinition::PageNumber {
            param,
            start,
            page_size_param,
            page_size,
        } => {
            let mut paginator = PageNumberPaginator::new(param, *start);
            if let (Some(size_param), Some(size)) = (page_size_param, page_size) {
                paginator = paginator.with_page_size(size_param, *size);
            }
            Box::new(paginator)
        }
        PaginationDefinition::Offset {
            param,
            start,
            step,
            limit_param,
        } => {
            let mut paginator = OffsetPaginator::new(param, *start, *step);
            if let Some(limit) = limit_param {
                paginator = paginator.with_limit_param(limit);
            }
            Box::new(paginator)
        }
        PaginationDefinition::Cursor { param } => Box::new(CursorPaginator::new(param)),
        PaginationDefinition::Path { template, start } => {
            Box::new(PathPaginator::new(template, *start).with_vars(vars))
        }
        PaginationDefinition::None => Box::new(NoPaginator),
    }
}

/// Build the record extractor for a job
pub(crate) fn build_extractor(
    def: &ExtractorDefinition,
    ctx: &TemplateContext,
) -> Result<Box<dyn FieldExtractor>> {
    Ok(match def {
        ExtractorDefinition::Css {
            item,
            fields,
            base_url,
        } => {
            let mut extractor = CssExtractor::new(item, fields.clone())?;
            if let Some(base) = base_url {
                extractor = extractor.with_base_url(&template::render(base, ctx)?)?;
            }
            Box::new(extractor)
        }
        ExtractorDefinition::Regex { pattern } => Box::new(RegexExtractor::new(pattern)?),
        ExtractorDefinition::Json { records, fields } => {
            let mut extractor = JsonExtractor::new(records.clone());
            for (name, path) in fields {
                extractor = extractor.with_field(name, path);
            }
            Box::new(extractor)
        }
    })
}
