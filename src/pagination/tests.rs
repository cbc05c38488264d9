//! Tests for pagination module

use super::*;
use test_case::test_case;

// ============================================================================
// PageToken Tests
// ============================================================================

#[test]
fn test_page_token_advance_is_monotonic() {
    let signal = ContinuationSignal::new();
    let mut token = PageToken::page(2);

    for expected in 3..8 {
        token = token.advance(&signal).unwrap();
        assert_eq!(token.page_number(), Some(expected));
    }
}

#[test]
fn test_page_token_overflow_cannot_advance() {
    let signal = ContinuationSignal::new();
    assert!(PageToken::page(u32::MAX).advance(&signal).is_none());
    assert!(PageToken::offset(u32::MAX - 5, 10).advance(&signal).is_none());
}

#[test]
fn test_offset_token_advance() {
    let next = PageToken::offset(0, 10)
        .advance(&ContinuationSignal::new())
        .unwrap();
    assert_eq!(next, PageToken::offset(10, 10));
}

#[test]
fn test_cursor_token_takes_next_cursor() {
    let signal = ContinuationSignal::new().with_next_cursor("CAEQAw");
    let next = PageToken::first_cursor().advance(&signal).unwrap();
    assert_eq!(next.cursor_value(), Some("CAEQAw"));
}

#[test_case(ContinuationSignal::new() ; "no cursor")]
#[test_case(ContinuationSignal::new().with_next_cursor("") ; "empty cursor")]
fn test_cursor_token_without_next_cursor_stops(signal: ContinuationSignal) {
    assert!(PageToken::cursor("abc").advance(&signal).is_none());
}

#[test]
fn test_scroll_token_records_height() {
    let signal = ContinuationSignal::new().with_fingerprint(250);
    let next = PageToken::scroll_start().advance(&signal).unwrap();
    assert_eq!(next, PageToken::Scroll { height: Some(250) });

    // A page with no measurement keeps the last known height
    let next = next.advance(&ContinuationSignal::new()).unwrap();
    assert_eq!(next, PageToken::Scroll { height: Some(250) });
}

#[test]
fn test_page_token_display() {
    assert_eq!(PageToken::page(3).to_string(), "page 3");
    assert_eq!(PageToken::offset(20, 10).to_string(), "offset 20 (+10)");
    assert_eq!(PageToken::first_cursor().to_string(), "cursor <start>");
    assert_eq!(PageToken::cursor("x1").to_string(), "cursor x1");
    assert_eq!(PageToken::scroll_start().to_string(), "scroll <start>");
}

#[test]
fn test_page_token_serde() {
    let token: PageToken = serde_json::from_str(r#"{"type":"page","number":2}"#).unwrap();
    assert_eq!(token, PageToken::page(2));

    let json = serde_json::to_value(PageToken::cursor("abc")).unwrap();
    assert_eq!(json, serde_json::json!({"type": "cursor", "cursor": "abc"}));
}

// ============================================================================
// TerminationState Tests
// ============================================================================

#[test]
fn test_termination_continue_by_default() {
    let state = TerminationState::from_signal(&ContinuationSignal::new(), None);
    assert_eq!(state, TerminationState::Continue);
}

#[test]
fn test_termination_precedence_not_found_first() {
    let signal = ContinuationSignal {
        not_found: true,
        pagination_disabled: true,
        fingerprint: Some(100),
        next_cursor: None,
    };
    assert_eq!(
        TerminationState::from_signal(&signal, Some(100)),
        TerminationState::StopPageNotFound
    );
}

#[test]
fn test_termination_precedence_disabled_before_unchanged() {
    let signal = ContinuationSignal::last_page().with_fingerprint(100);
    assert_eq!(
        TerminationState::from_signal(&signal, Some(100)),
        TerminationState::StopPaginationDisabled
    );
}

#[test_case(None, Some(100), TerminationState::Continue ; "first measurement")]
#[test_case(Some(100), Some(250), TerminationState::Continue ; "content grew")]
#[test_case(Some(250), Some(250), TerminationState::StopUnchangedContent ; "content unchanged")]
#[test_case(Some(250), None, TerminationState::Continue ; "no measurement")]
fn test_termination_unchanged_content(
    previous: Option<u64>,
    current: Option<u64>,
    expected: TerminationState,
) {
    let signal = ContinuationSignal {
        fingerprint: current,
        ..Default::default()
    };
    assert_eq!(TerminationState::from_signal(&signal, previous), expected);
}

// ============================================================================
// Page Number Paginator Tests
// ============================================================================

#[test]
fn test_page_number_paginator() {
    let paginator = PageNumberPaginator::new("page", 1);
    assert_eq!(paginator.initial_token(), PageToken::page(1));

    let request = paginator
        .request("https://example.com/search", &PageToken::page(4))
        .unwrap();
    assert_eq!(request.url, "https://example.com/search");
    assert_eq!(request.query.get("page"), Some(&"4".to_string()));
}

#[test]
fn test_page_number_paginator_with_page_size() {
    let paginator = PageNumberPaginator::new("page", 1).with_page_size("per_page", 50);
    let request = paginator.request("https://x", &PageToken::page(1)).unwrap();

    assert_eq!(request.query.get("per_page"), Some(&"50".to_string()));
}

#[test]
fn test_page_number_paginator_rejects_cursor() {
    let paginator = PageNumberPaginator::new("page", 1);
    let err = paginator
        .request("https://x", &PageToken::cursor("abc"))
        .unwrap_err();
    assert!(err.to_string().contains("page number pagination"));
}

// ============================================================================
// Offset Paginator Tests
// ============================================================================

#[test]
fn test_offset_paginator() {
    let paginator = OffsetPaginator::new("start", 0, 10).with_limit_param("num");
    assert_eq!(paginator.initial_token(), PageToken::offset(0, 10));

    let request = paginator
        .request("https://x/search", &PageToken::offset(20, 10))
        .unwrap();
    assert_eq!(request.query.get("start"), Some(&"20".to_string()));
    assert_eq!(request.query.get("num"), Some(&"10".to_string()));
}

// ============================================================================
// Cursor Paginator Tests
// ============================================================================

#[test]
fn test_cursor_paginator_first_page_has_no_cursor() {
    let paginator = CursorPaginator::new("next_page_token");
    let request = paginator
        .request("https://x", &paginator.initial_token())
        .unwrap();
    assert!(request.query.is_empty());
}

#[test]
fn test_cursor_paginator_sends_cursor() {
    let paginator = CursorPaginator::new("next_page_token");
    let request = paginator
        .request("https://x", &PageToken::cursor("CAEQAw"))
        .unwrap();
    assert_eq!(
        request.query.get("next_page_token"),
        Some(&"CAEQAw".to_string())
    );
}

// ============================================================================
// Path Paginator Tests
// ============================================================================

#[test]
fn test_path_paginator_relative_template() {
    let paginator = PathPaginator::new("/journal/{{ vars.journal }}/{{ page.number }}", 2)
        .with_vars(serde_json::json!({ "journal": "Some-Journal" }));

    assert_eq!(paginator.initial_token(), PageToken::page(2));

    let request = paginator
        .request("https://www.example.net/", &PageToken::page(5))
        .unwrap();
    assert_eq!(request.url, "https://www.example.net/journal/Some-Journal/5");
    assert!(request.query.is_empty());
}

#[test]
fn test_path_paginator_absolute_template() {
    let paginator = PathPaginator::new("https://other.example/p/{{ page.offset }}", 0)
        .starting_at(PageToken::offset(0, 20));

    let request = paginator
        .request("https://ignored", &PageToken::offset(40, 20))
        .unwrap();
    assert_eq!(request.url, "https://other.example/p/40");
}

#[test]
fn test_path_paginator_undefined_variable() {
    let paginator = PathPaginator::new("/x/{{ vars.missing }}", 1);
    assert!(paginator.request("https://x", &PageToken::page(1)).is_err());
}

// ============================================================================
// No Paginator Tests
// ============================================================================

#[test]
fn test_no_paginator() {
    let paginator = NoPaginator;
    assert!(paginator.is_single_page());
    assert!(!PageNumberPaginator::new("page", 1).is_single_page());

    let request = paginator
        .request("https://x/one", &paginator.initial_token())
        .unwrap();
    assert_eq!(request, PageRequest::new("https://x/one"));
}
