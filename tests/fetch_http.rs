//! Integration tests for the plain HTTP fetch path against a local mock
//! server. This path must never launch a browser.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use pagescout::browser::{BrowserLauncher, BrowserSession};
use pagescout::core::{BrowserConfig, Config, FetchError, Result};
use pagescout::llm::LlmClient;
use pagescout::PageFetcher;

/// LLM double for paths that must never call the model
struct UnusedLlm;

#[async_trait]
impl LlmClient for UnusedLlm {
    async fn complete(&self, _system_prompt: &str, _user_prompt: &str) -> Result<String> {
        Err(FetchError::llm("the fast path must not call the model"))
    }

    fn name(&self) -> &str {
        "unused"
    }
}

/// Launcher double counting launches; the fast path must leave it at zero
#[derive(Clone, Default)]
struct CountingLauncher {
    launches: Arc<AtomicUsize>,
}

#[async_trait]
impl BrowserLauncher for CountingLauncher {
    async fn launch(&self, _config: &BrowserConfig) -> Result<Box<dyn BrowserSession>> {
        self.launches.fetch_add(1, Ordering::SeqCst);
        Err(FetchError::browser("no browser in this test"))
    }
}

fn fetcher_with(launcher: CountingLauncher) -> PageFetcher {
    PageFetcher::with_collaborators(Config::default(), Arc::new(launcher), Arc::new(UnusedLlm))
        .unwrap()
}

const PAGE: &str = "<html><head><title>Home</title></head><body><h1>Welcome</h1></body></html>";

#[tokio::test]
async fn test_fast_path_captures_snapshot() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(PAGE, "text/html; charset=utf-8"),
        )
        .mount(&server)
        .await;

    let launcher = CountingLauncher::default();
    let fetcher = fetcher_with(launcher.clone());
    let snapshot = fetcher.fetch(&server.uri(), &[]).await.unwrap();

    assert_eq!(snapshot.status_code, 200);
    assert_eq!(snapshot.html, PAGE);
    assert_eq!(
        snapshot.headers.get("content-type"),
        Some("text/html; charset=utf-8")
    );
    assert_eq!(launcher.launches.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_fast_path_is_idempotent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(PAGE, "text/html"),
        )
        .mount(&server)
        .await;

    let fetcher = fetcher_with(CountingLauncher::default());
    let first = fetcher.fetch(&server.uri(), &[]).await.unwrap();
    let second = fetcher.fetch(&server.uri(), &[]).await.unwrap();
    assert_eq!(first.html, second.html);
    assert_eq!(first.status_code, second.status_code);
}

#[tokio::test]
async fn test_http_error_status_is_typed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let fetcher = fetcher_with(CountingLauncher::default());
    let err = fetcher.fetch(&server.uri(), &[]).await.unwrap_err();
    assert!(matches!(err, FetchError::HttpError(404)));
}

#[tokio::test]
async fn test_non_html_body_is_unsupported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw("{\"ok\":true}", "application/json"),
        )
        .mount(&server)
        .await;

    let fetcher = fetcher_with(CountingLauncher::default());
    let err = fetcher.fetch(&server.uri(), &[]).await.unwrap_err();
    match err {
        FetchError::UnsupportedContent(label) => assert!(label.contains("application/json")),
        other => panic!("expected UnsupportedContent, got {:?}", other),
    }
}

#[tokio::test]
async fn test_html_like_media_types_are_not_enough() {
    // Only text/html is accepted; other markup types fail the guard.
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(PAGE, "application/xhtml+xml"),
        )
        .mount(&server)
        .await;

    let fetcher = fetcher_with(CountingLauncher::default());
    let err = fetcher.fetch(&server.uri(), &[]).await.unwrap_err();
    assert!(matches!(err, FetchError::UnsupportedContent(_)));
}

#[tokio::test]
async fn test_empty_body_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw("   \n  ", "text/html"),
        )
        .mount(&server)
        .await;

    let fetcher = fetcher_with(CountingLauncher::default());
    let err = fetcher.fetch(&server.uri(), &[]).await.unwrap_err();
    assert!(matches!(err, FetchError::EmptyBody));
}

#[tokio::test]
async fn test_repeated_set_cookie_headers_are_kept() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .append_header("set-cookie", "session=abc; Path=/")
                .append_header("set-cookie", "theme=dark; Path=/")
                .set_body_raw(PAGE, "text/html"),
        )
        .mount(&server)
        .await;

    let fetcher = fetcher_with(CountingLauncher::default());
    let snapshot = fetcher.fetch(&server.uri(), &[]).await.unwrap();
    let cookies = snapshot.headers.get_all("set-cookie");
    assert_eq!(cookies.len(), 2);
    assert!(cookies[0].starts_with("session="));
    assert!(cookies[1].starts_with("theme="));
}

#[tokio::test]
async fn test_unreachable_host_is_typed() {
    let fetcher = fetcher_with(CountingLauncher::default());
    let err = fetcher
        .fetch("http://127.0.0.1:1/", &[])
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Unreachable(_)));
}
