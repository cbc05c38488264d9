//! Pagination strategy implementations
//!
//! Each strategy maps a [`PageToken`] onto a concrete request.

use super::types::{PageRequest, PageToken, Paginator};
use crate::error::{Error, Result};
use crate::template::{self, TemplateContext};
use serde_json::{json, Value};

fn unexpected_token(strategy: &str, token: &PageToken) -> Error {
    Error::config(format!("{strategy} pagination cannot fetch {token}"))
}

// ============================================================================
// Page Number Pagination
// ============================================================================

/// Page number pagination (e.g., traditional web pagination)
///
/// Common patterns:
/// - `?page=2`
/// - `?page=2&per_page=50`
#[derive(Debug, Clone)]
pub struct PageNumberPaginator {
    /// Query parameter name for page number
    pub page_param: String,
    /// First page number (usually 1, sometimes 0 or 2)
    pub start_page: u32,
    /// Optional page size parameter name
    pub page_size_param: Option<String>,
    /// Page size value
    pub page_size: Option<u32>,
}

impl PageNumberPaginator {
    /// Create a new page number paginator
    pub fn new(page_param: impl Into<String>, start_page: u32) -> Self {
        Self {
            page_param: page_param.into(),
            start_page,
            page_size_param: None,
            page_size: None,
        }
    }

    /// Set page size parameter
    #[must_use]
    pub fn with_page_size(mut self, param: impl Into<String>, size: u32) -> Self {
        self.page_size_param = Some(param.into());
        self.page_size = Some(size);
        self
    }
}

impl Paginator for PageNumberPaginator {
    fn initial_token(&self) -> PageToken {
        PageToken::page(self.start_page)
    }

    fn request(&self, base_url: &str, token: &PageToken) -> Result<PageRequest> {
        let page = token
            .page_number()
            .ok_or_else(|| unexpected_token("page number", token))?;

        let mut request = PageRequest::new(base_url).query(&self.page_param, page.to_string());
        if let (Some(param), Some(size)) = (&self.page_size_param, self.page_size) {
            request = request.query(param, size.to_string());
        }
        Ok(request)
    }
}

// ============================================================================
// Offset Pagination
// ============================================================================

/// Offset-based pagination
///
/// Common patterns:
/// - `?start=10` (search result pages of ten)
/// - `?offset=100&limit=50`
#[derive(Debug, Clone)]
pub struct OffsetPaginator {
    /// Query parameter name for offset
    pub offset_param: String,
    /// First offset
    pub start: u32,
    /// Offset increment per page
    pub step: u32,
    /// Optional limit parameter name (sent with `step` as value)
    pub limit_param: Option<String>,
}

impl OffsetPaginator {
    /// Create a new offset paginator
    pub fn new(offset_param: impl Into<String>, start: u32, step: u32) -> Self {
        Self {
            offset_param: offset_param.into(),
            start,
            step,
            limit_param: None,
        }
    }

    /// Send the step as a limit parameter
    #[must_use]
    pub fn with_limit_param(mut self, param: impl Into<String>) -> Self {
        self.limit_param = Some(param.into());
        self
    }
}

impl Paginator for OffsetPaginator {
    fn initial_token(&self) -> PageToken {
        PageToken::offset(self.start, self.step)
    }

    fn request(&self, base_url: &str, token: &PageToken) -> Result<PageRequest> {
        let offset = token
            .offset_value()
            .ok_or_else(|| unexpected_token("offset", token))?;

        let mut request =
            PageRequest::new(base_url).query(&self.offset_param, offset.to_string());
        if let Some(param) = &self.limit_param {
            request = request.query(param, self.step.to_string());
        }
        Ok(request)
    }
}

// ============================================================================
// Cursor Pagination
// ============================================================================

/// Cursor-based pagination (e.g., `next_page_token`)
///
/// The first request carries no cursor; later requests send the cursor the
/// previous page handed out.
#[derive(Debug, Clone)]
pub struct CursorPaginator {
    /// Query parameter name for cursor
    pub cursor_param: String,
}

impl CursorPaginator {
    /// Create a new cursor paginator
    pub fn new(cursor_param: impl Into<String>) -> Self {
        Self {
            cursor_param: cursor_param.into(),
        }
    }
}

impl Paginator for CursorPaginator {
    fn initial_token(&self) -> PageToken {
        PageToken::first_cursor()
    }

    fn request(&self, base_url: &str, token: &PageToken) -> Result<PageRequest> {
        if !matches!(token, PageToken::Cursor { .. }) {
            return Err(unexpected_token("cursor", token));
        }

        let mut request = PageRequest::new(base_url);
        if let Some(cursor) = token.cursor_value() {
            request = request.query(&self.cursor_param, cursor);
        }
        Ok(request)
    }
}

// ============================================================================
// Path Pagination
// ============================================================================

/// Path-style pagination (page position inside the URL path)
///
/// Renders a URL template such as `/journal/{{ vars.journal }}/{{ page.number }}`.
/// Relative templates are joined onto the base URL.
#[derive(Debug, Clone)]
pub struct PathPaginator {
    /// URL or path template
    pub template: String,
    /// First token
    pub start: PageToken,
    /// Job variables available as `vars.*`
    pub vars: Value,
}

impl PathPaginator {
    /// Create a path paginator over page numbers
    pub fn new(template: impl Into<String>, start_page: u32) -> Self {
        Self {
            template: template.into(),
            start: PageToken::page(start_page),
            vars: Value::Null,
        }
    }

    /// Start from an arbitrary token (e.g. an offset)
    #[must_use]
    pub fn starting_at(mut self, token: PageToken) -> Self {
        self.start = token;
        self
    }

    /// Set job variables
    #[must_use]
    pub fn with_vars(mut self, vars: Value) -> Self {
        self.vars = vars;
        self
    }
}

impl Paginator for PathPaginator {
    fn initial_token(&self) -> PageToken {
        self.start.clone()
    }

    fn request(&self, base_url: &str, token: &PageToken) -> Result<PageRequest> {
        let mut ctx = TemplateContext::with_vars(self.vars.clone());
        ctx.set_page(page_context(token));
        let rendered = template::render(&self.template, &ctx)?;

        let url = if rendered.starts_with("http://") || rendered.starts_with("https://") {
            rendered
        } else {
            format!(
                "{}/{}",
                base_url.trim_end_matches('/'),
                rendered.trim_start_matches('/')
            )
        };
        Ok(PageRequest::new(url))
    }
}

/// Template values describing a token (`page.number`, `page.offset`, `page.cursor`)
pub fn page_context(token: &PageToken) -> Value {
    match token {
        PageToken::Page { number } => json!({ "number": number }),
        PageToken::Offset { offset, step } => json!({ "offset": offset, "step": step }),
        PageToken::Cursor { cursor } => json!({ "cursor": cursor }),
        PageToken::Scroll { height } => json!({ "height": height }),
    }
}

// ============================================================================
// No Pagination
// ============================================================================

/// No pagination - single request
#[derive(Debug, Clone, Default)]
pub struct NoPaginator;

impl Paginator for NoPaginator {
    fn initial_token(&self) -> PageToken {
        PageToken::page(1)
    }

    fn request(&self, base_url: &str, _token: &PageToken) -> Result<PageRequest> {
        Ok(PageRequest::new(base_url))
    }

    fn is_single_page(&self) -> bool {
        true
    }
}
