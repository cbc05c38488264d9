//! Tests for the HTTP client module

use super::*;
use crate::error::Error;
use crate::types::BackoffType;
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fast_config(server: &MockServer) -> HttpClientConfig {
    HttpClientConfig::builder()
        .base_url(server.uri())
        .no_rate_limit()
        .backoff(
            BackoffType::Constant,
            Duration::from_millis(5),
            Duration::from_millis(20),
        )
        .build()
}

#[test]
fn test_http_client_config_default() {
    let config = HttpClientConfig::default();
    assert_eq!(config.timeout, Duration::from_secs(30));
    assert_eq!(config.max_retries, 3);
    assert!(config.base_url.is_none());
    assert!(config.rate_limit.is_some());
    assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
}

#[test]
fn test_http_client_config_builder() {
    let config = HttpClientConfig::builder()
        .base_url("https://www.example.net")
        .timeout(Duration::from_secs(60))
        .max_retries(5)
        .backoff(
            BackoffType::Linear,
            Duration::from_millis(200),
            Duration::from_secs(30),
        )
        .header("Accept-Language", "en-US")
        .user_agent("test-agent/1.0")
        .build();

    assert_eq!(config.base_url, Some("https://www.example.net".to_string()));
    assert_eq!(config.timeout, Duration::from_secs(60));
    assert_eq!(config.max_retries, 5);
    assert_eq!(config.backoff_type, BackoffType::Linear);
    assert_eq!(config.initial_backoff, Duration::from_millis(200));
    assert_eq!(config.max_backoff, Duration::from_secs(30));
    assert_eq!(
        config.default_headers.get("Accept-Language"),
        Some(&"en-US".to_string())
    );
    assert_eq!(config.user_agent, "test-agent/1.0");
}

#[test]
fn test_request_config_builder() {
    let config = RequestConfig::new()
        .query("page", "1")
        .header("Referer", "https://www.example.net")
        .timeout(Duration::from_secs(10))
        .retries(2);

    assert_eq!(config.query.get("page"), Some(&"1".to_string()));
    assert_eq!(
        config.headers.get("Referer"),
        Some(&"https://www.example.net".to_string())
    );
    assert_eq!(config.timeout, Some(Duration::from_secs(10)));
    assert_eq!(config.max_retries, Some(2));
}

#[tokio::test]
async fn test_fetch_text_returns_body_and_url() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>page two</html>"))
        .mount(&server)
        .await;

    let client = HttpClient::with_config(fast_config(&server)).unwrap();
    let page = client
        .fetch_text("/search", RequestConfig::new().query("page", "2"))
        .await
        .unwrap();

    assert_eq!(page.status, 200);
    assert_eq!(page.body, "<html>page two</html>");
    assert!(page.url.starts_with(&server.uri()));
    assert!(page.url.contains("page=2"));
}

#[tokio::test]
async fn test_http_client_sends_default_and_request_headers() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/headers"))
        .and(header("Accept-Language", "en-US"))
        .and(header("Referer", "https://www.example.net"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&server)
        .await;

    let config = HttpClientConfig::builder()
        .base_url(server.uri())
        .no_rate_limit()
        .header("Accept-Language", "en-US")
        .build();
    let client = HttpClient::with_config(config).unwrap();

    let page = client
        .fetch_text(
            "/headers",
            RequestConfig::new().header("Referer", "https://www.example.net"),
        )
        .await
        .unwrap();
    assert_eq!(page.status, 200);
}

#[tokio::test]
async fn test_http_client_404_error_keeps_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Page not found"))
        .mount(&server)
        .await;

    let client = HttpClient::with_config(fast_config(&server)).unwrap();
    let err = client
        .fetch_text("/missing", RequestConfig::new())
        .await
        .unwrap_err();

    match err {
        Error::HttpStatus { status, body } => {
            assert_eq!(status, 404);
            assert_eq!(body, "Page not found");
        }
        other => panic!("Expected HttpStatus, got {other:?}"),
    }
}

#[tokio::test]
async fn test_http_client_retry_on_500() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(200).set_body_string("recovered"))
        .mount(&server)
        .await;

    let client = HttpClient::with_config(fast_config(&server)).unwrap();
    let page = client
        .fetch_text("/flaky", RequestConfig::new())
        .await
        .unwrap();
    assert_eq!(page.body, "recovered");
}

#[tokio::test]
async fn test_http_client_gives_up_after_max_retries() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/down"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let mut config = fast_config(&server);
    config.max_retries = 2;
    let client = HttpClient::with_config(config).unwrap();

    let err = client
        .fetch_text("/down", RequestConfig::new())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::HttpStatus { status: 503, .. }));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_http_client_full_url_ignores_base() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/absolute"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&server)
        .await;

    let config = HttpClientConfig::builder()
        .base_url("https://unused.invalid")
        .no_rate_limit()
        .build();
    let client = HttpClient::with_config(config).unwrap();

    let page = client
        .fetch_text(&format!("{}/absolute", server.uri()), RequestConfig::new())
        .await
        .unwrap();
    assert_eq!(page.body, "ok");
}

#[test]
fn test_calculate_backoff_constant() {
    let config = HttpClientConfig::builder()
        .backoff(
            BackoffType::Constant,
            Duration::from_millis(100),
            Duration::from_secs(10),
        )
        .build();
    let client = HttpClient::with_config(config).unwrap();

    assert_eq!(client.calculate_backoff(0), Duration::from_millis(100));
    assert_eq!(client.calculate_backoff(5), Duration::from_millis(100));
}

#[test]
fn test_calculate_backoff_linear() {
    let config = HttpClientConfig::builder()
        .backoff(
            BackoffType::Linear,
            Duration::from_millis(100),
            Duration::from_secs(10),
        )
        .build();
    let client = HttpClient::with_config(config).unwrap();

    assert_eq!(client.calculate_backoff(0), Duration::from_millis(100));
    assert_eq!(client.calculate_backoff(2), Duration::from_millis(300));
}

#[test]
fn test_calculate_backoff_exponential_respects_max() {
    let config = HttpClientConfig::builder()
        .backoff(
            BackoffType::Exponential,
            Duration::from_millis(100),
            Duration::from_secs(1),
        )
        .build();
    let client = HttpClient::with_config(config).unwrap();

    assert_eq!(client.calculate_backoff(0), Duration::from_millis(100));
    assert_eq!(client.calculate_backoff(3), Duration::from_millis(800));
    assert_eq!(client.calculate_backoff(10), Duration::from_secs(1));
    assert_eq!(client.calculate_backoff(40), Duration::from_secs(1));
}

#[test]
fn test_http_client_debug() {
    let client = HttpClient::new().unwrap();
    let debug = format!("{client:?}");
    assert!(debug.contains("HttpClient"));
    assert!(debug.contains("has_rate_limiter: true"));
    assert!(client.has_rate_limiter());
}
