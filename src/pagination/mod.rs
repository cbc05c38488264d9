//! Pagination module
//!
//! Supports: Page Number, Offset, Cursor, Path template, Scroll position
//!
//! # Overview
//!
//! A [`PageToken`] says where the loop is in a source. Every fetched page
//! carries a [`ContinuationSignal`]; [`TerminationState::from_signal`] turns
//! that signal into a continue/stop decision. Paginators map tokens onto
//! concrete requests for request/response sources.

mod strategies;
mod types;

pub use strategies::{
    page_context, CursorPaginator, NoPaginator, OffsetPaginator, PageNumberPaginator,
    PathPaginator,
};
pub use types::{ContinuationSignal, PageRequest, PageToken, Paginator, TerminationState};

#[cfg(test)]
mod tests;
