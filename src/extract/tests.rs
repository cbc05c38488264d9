//! Tests for extraction module

use super::*;
use crate::error::Error;
use crate::pagination::PageToken;
use crate::source::RawPage;
use pretty_assertions::assert_eq;
use serde_json::json;

const RESULTS_HTML: &str = r#"
<html><body>
  <div class="result">
    <h3>  First
        result </h3>
    <a href="/item/1">open</a>
    <span class="tag">rust</span><span class="tag">web</span>
    <div class="meta">Cited by 42</div>
  </div>
  <div class="result">
    <h3>Second result</h3>
    <a href="https://other.example.org/2">open</a>
  </div>
</body></html>
"#;

fn html_page(body: &str) -> RawPage {
    RawPage::new(PageToken::page(1), body).with_url("https://www.example.net/search?page=1")
}

fn json_page(body: serde_json::Value) -> RawPage {
    RawPage::new(PageToken::first_cursor(), body.to_string())
}

fn record(value: serde_json::Value) -> Record {
    match value {
        serde_json::Value::Object(map) => map,
        other => panic!("not an object: {other}"),
    }
}

// ============================================================================
// CSS Extractor Tests
// ============================================================================

#[test]
fn test_css_extractor_reads_text_and_absolute_links() {
    let extractor = CssExtractor::new(
        ".result",
        vec![
            FieldSpec::text("title", "h3"),
            FieldSpec::attr("link", "a", "href").absolute(),
        ],
    )
    .unwrap();

    let records = extractor.extract(&html_page(RESULTS_HTML)).unwrap();

    assert_eq!(
        records,
        vec![
            record(json!({"title": "First result", "link": "https://www.example.net/item/1"})),
            record(json!({"title": "Second result", "link": "https://other.example.org/2"})),
        ]
    );
}

#[test]
fn test_css_extractor_missing_optional_field_is_null() {
    let extractor =
        CssExtractor::new(".result", vec![FieldSpec::text("meta", ".meta")]).unwrap();

    let records = extractor.extract(&html_page(RESULTS_HTML)).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["meta"], json!("Cited by 42"));
    assert_eq!(records[1]["meta"], json!(null));
}

#[test]
fn test_css_extractor_missing_required_field_is_mismatch() {
    let extractor =
        CssExtractor::new(".result", vec![FieldSpec::text("meta", ".meta").required()]).unwrap();

    let err = extractor.extract(&html_page(RESULTS_HTML)).unwrap_err();
    assert!(matches!(err, Error::ExtractionMismatch { .. }));
    assert!(err.to_string().contains("meta"));
}

#[test]
fn test_css_extractor_multiple_collects_array() {
    let extractor =
        CssExtractor::new(".result", vec![FieldSpec::text("tags", ".tag").multiple()]).unwrap();

    let records = extractor.extract(&html_page(RESULTS_HTML)).unwrap();
    assert_eq!(records[0]["tags"], json!(["rust", "web"]));
    assert_eq!(records[1]["tags"], json!([]));
}

#[test]
fn test_css_extractor_pattern_uses_first_group() {
    let extractor = CssExtractor::new(
        ".result",
        vec![FieldSpec::text("cited_by", ".meta").pattern(r"Cited by (\d+)")],
    )
    .unwrap();

    let records = extractor.extract(&html_page(RESULTS_HTML)).unwrap();
    assert_eq!(records[0]["cited_by"], json!("42"));
}

#[test]
fn test_css_extractor_field_without_selector_reads_item() {
    let html = r#"<ul><li data-id="a1"> one </li><li data-id="a2">two</li></ul>"#;
    let mut id = FieldSpec::attr("id", "li", "data-id");
    id.selector = None;
    let mut text = FieldSpec::text("text", "li");
    text.selector = None;

    let extractor = CssExtractor::new("li", vec![id, text]).unwrap();
    let records = extractor.extract(&html_page(html)).unwrap();

    assert_eq!(
        records,
        vec![
            record(json!({"id": "a1", "text": "one"})),
            record(json!({"id": "a2", "text": "two"})),
        ]
    );
}

#[test]
fn test_css_extractor_uses_base_url_when_page_has_none() {
    let fields = vec![FieldSpec::attr("link", "a", "href").absolute()];
    let extractor = CssExtractor::new(".result", fields)
        .unwrap()
        .with_base_url("https://mirror.example.net/")
        .unwrap();

    let page = RawPage::new(PageToken::page(1), RESULTS_HTML);
    let records = extractor.extract(&page).unwrap();
    assert_eq!(records[0]["link"], json!("https://mirror.example.net/item/1"));
}

#[test]
fn test_css_extractor_no_items_is_empty_not_error() {
    let extractor = CssExtractor::new(".result", vec![FieldSpec::text("title", "h3")]).unwrap();
    let records = extractor
        .extract(&html_page("<html><body><p>nothing here</p></body></html>"))
        .unwrap();
    assert!(records.is_empty());
}

#[test]
fn test_css_extractor_invalid_selector() {
    let err = CssExtractor::new("div[", vec![FieldSpec::text("title", "h3")]).unwrap_err();
    assert!(matches!(err, Error::Selector { .. }));
}

#[test]
fn test_css_extractor_requires_fields() {
    let err = CssExtractor::new(".result", vec![]).unwrap_err();
    assert!(matches!(err, Error::Config { .. }));
}

#[test]
fn test_field_spec_deserialize_defaults() {
    let spec: FieldSpec = serde_yaml::from_str("name: title\nselector: h3\n").unwrap();
    assert_eq!(spec, FieldSpec::text("title", "h3"));
}

// ============================================================================
// Regex Extractor Tests
// ============================================================================

#[test]
fn test_regex_extractor_named_groups() {
    let extractor =
        RegexExtractor::new(r#"<a href="(?P<link>[^"]+)">(?P<title>[^<]*)</a>"#).unwrap();
    let page = html_page(r#"<a href="/a">Alpha</a> <a href="/b"> </a>"#);

    let records = extractor.extract(&page).unwrap();
    assert_eq!(
        records,
        vec![
            record(json!({"link": "/a", "title": "Alpha"})),
            record(json!({"link": "/b", "title": null})),
        ]
    );
}

#[test]
fn test_regex_extractor_requires_named_group() {
    let err = RegexExtractor::new(r"(\d+)").unwrap_err();
    assert!(matches!(err, Error::InvalidConfigValue { .. }));
}

#[test]
fn test_regex_extractor_invalid_pattern() {
    let err = RegexExtractor::new(r"(?P<x>[").unwrap_err();
    assert!(matches!(err, Error::Pattern(_)));
}

// ============================================================================
// JSON Extractor Tests
// ============================================================================

#[test]
fn test_json_extractor_record_path() {
    let extractor = JsonExtractor::new(Some("data.items".to_string()));
    let page = json_page(json!({"data": {"items": [{"id": 1}, {"id": 2}]}}));

    let records = extractor.extract(&page).unwrap();
    assert_eq!(records, vec![record(json!({"id": 1})), record(json!({"id": 2}))]);
}

#[test]
fn test_json_extractor_projects_fields() {
    let extractor = JsonExtractor::new(Some("$.organic_results".to_string()))
        .with_field("title", "title")
        .with_field("source", "publication_info.summary");
    let page = json_page(json!({
        "organic_results": [
            {"title": "A", "publication_info": {"summary": "Journal A"}},
            {"title": "B"}
        ]
    }));

    let records = extractor.extract(&page).unwrap();
    assert_eq!(
        records,
        vec![
            record(json!({"title": "A", "source": "Journal A"})),
            record(json!({"title": "B", "source": null})),
        ]
    );
}

#[test]
fn test_json_extractor_missing_path_is_empty() {
    let extractor = JsonExtractor::new(Some("images_results".to_string()));
    let records = extractor.extract(&json_page(json!({"error": "no results"}))).unwrap();
    assert!(records.is_empty());
}

#[test]
fn test_json_extractor_wraps_scalars() {
    let extractor = JsonExtractor::new(None);
    let records = extractor.extract(&json_page(json!(["a", "b"]))).unwrap();
    assert_eq!(
        records,
        vec![record(json!({"value": "a"})), record(json!({"value": "b"}))]
    );
}

#[test]
fn test_json_extractor_non_json_is_mismatch() {
    let extractor = JsonExtractor::new(None);
    let err = extractor.extract(&html_page("<html></html>")).unwrap_err();
    assert!(matches!(err, Error::ExtractionMismatch { .. }));
}

// ============================================================================
// Path Tests
// ============================================================================

#[test]
fn test_lookup_path_simple_and_indexed() {
    let value = json!({"data": {"items": [{"id": 1}, {"id": 2}, {"id": 3}]}});

    assert_eq!(lookup_path(&value, "data.items[0].id"), Some(json!(1)));
    assert_eq!(lookup_path(&value, "$.data.items[-1].id"), Some(json!(3)));
    assert_eq!(lookup_path(&value, "data.items[5].id"), None);
    assert_eq!(lookup_path(&value, "data.missing"), None);
    assert_eq!(lookup_path(&value, "$"), Some(value.clone()));
}

#[test]
fn test_lookup_path_wildcard() {
    let value = json!({"items": [{"id": 1}, {"id": 2}]});
    assert_eq!(lookup_path(&value, "$.items[*].id"), Some(json!([1, 2])));
}

#[test]
fn test_select_records_without_path() {
    let value = json!({"id": 1});
    assert_eq!(select_records(&value, None).unwrap(), vec![json!({"id": 1})]);
}

// ============================================================================
// Identity Tests
// ============================================================================

#[test]
fn test_record_identity_field() {
    let identity = RecordIdentity::field("link");
    let a = record(json!({"link": "https://a", "title": "A"}));
    let b = record(json!({"link": "https://a", "title": "A (again)"}));

    assert_eq!(identity.key(&a), identity.key(&b));
    assert_eq!(identity.key(&a), "https://a");
}

#[test]
fn test_record_identity_fields_composite() {
    let identity = RecordIdentity::fields(["journal", "page"]);
    let a = record(json!({"journal": "x", "page": 2}));
    let b = record(json!({"journal": "x", "page": 3}));

    assert_ne!(identity.key(&a), identity.key(&b));
    assert_eq!(identity.key(&a), "x\u{1f}2");
}

#[test]
fn test_record_identity_missing_field_uses_whole_record() {
    let identity = RecordIdentity::field("link");
    let a = record(json!({"title": "A"}));
    let b = record(json!({"title": "B"}));

    assert_ne!(identity.key(&a), identity.key(&b));
    assert_eq!(identity.key(&a), RecordIdentity::Whole.key(&a));
}

#[test]
fn test_record_identity_deserialize() {
    let identity: RecordIdentity = serde_yaml::from_str("type: field\nname: link\n").unwrap();
    assert_eq!(identity, RecordIdentity::field("link"));

    let identity: RecordIdentity = serde_yaml::from_str("type: whole\n").unwrap();
    assert_eq!(identity, RecordIdentity::Whole);
}

#[test]
fn test_closures_implement_traits() {
    let extractor = |page: &RawPage| -> crate::error::Result<Vec<String>> {
        Ok(page.body.split(',').map(str::to_string).collect())
    };
    let identity = |record: &String| record.to_lowercase();

    let page = RawPage::new(PageToken::page(1), "A,b");
    let records = FieldExtractor::extract(&extractor, &page).unwrap();
    assert_eq!(records, vec!["A".to_string(), "b".to_string()]);
    assert_eq!(IdentityKey::key(&identity, &records[0]), "a");
}
