//! Fetch façade
//!
//! One entry point: `fetch(url, setup_instructions)` returning a
//! `PageSnapshot` or a typed failure. Without instructions a plain HTTP
//! client does the work; with instructions a scoped browser session is
//! launched, the setup sequence runs, and the post-setup DOM is captured.
//! The browser is released on every exit path.

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::browser::{BrowserLauncher, BrowserSession, CdpLauncher, PageHandle};
use crate::core::{Config, FetchError, PageHeaders, PageSnapshot, Result};
use crate::llm::{GeminiClient, LlmClient};
use crate::setup::{Executor, FailurePolicy, Orchestrator};

/// Fetches page snapshots over HTTP or through an automated browser
pub struct PageFetcher {
    config: Config,
    http: reqwest::Client,
    launcher: Arc<dyn BrowserLauncher>,
    llm: Arc<dyn LlmClient>,
}

impl PageFetcher {
    /// Build a fetcher with the production collaborators: headless Chrome
    /// and the configured model endpoint.
    pub fn new(config: Config) -> Result<Self> {
        let llm = Arc::new(GeminiClient::new(&config.llm)?);
        Self::with_collaborators(config, Arc::new(CdpLauncher), llm)
    }

    /// Build a fetcher with explicit collaborators
    pub fn with_collaborators(
        config: Config,
        launcher: Arc<dyn BrowserLauncher>,
        llm: Arc<dyn LlmClient>,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(config.fetcher.user_agent.clone())
            .timeout(std::time::Duration::from_secs(
                config.fetcher.request_timeout_secs,
            ))
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| FetchError::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            config,
            http,
            launcher,
            llm,
        })
    }

    /// Fetch a snapshot of `url`.
    ///
    /// An empty instruction list takes the plain HTTP path and never
    /// launches a browser. A non-empty list takes the agentic path.
    pub async fn fetch(&self, url: &str, setup_instructions: &[String]) -> Result<PageSnapshot> {
        let parsed = url::Url::parse(url)
            .map_err(|e| FetchError::config(format!("Invalid URL '{}': {}", url, e)))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(FetchError::config(format!(
                "Unsupported URL scheme: {}",
                parsed.scheme()
            )));
        }

        if setup_instructions.is_empty() {
            self.fetch_static(url).await
        } else {
            self.fetch_agentic(url, setup_instructions).await
        }
    }

    /// Plain HTTP path: fetch, then explicit guards on status, content type,
    /// body, and DOM, each with its own failure class.
    async fn fetch_static(&self, url: &str) -> Result<PageSnapshot> {
        info!(url, "fetching over plain HTTP");
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::from_transport(e, url))?;

        let status = response.status().as_u16();
        if status >= 400 {
            return Err(FetchError::HttpError(status));
        }

        let final_url = response.url().to_string();
        let mut headers = PageHeaders::new();
        for (name, value) in response.headers() {
            if let Ok(value) = value.to_str() {
                headers.append(name.to_string(), value.to_string());
            }
        }

        let content_type = headers.get("content-type").unwrap_or("").to_string();
        if !content_type.to_ascii_lowercase().contains("text/html") {
            let label = if content_type.is_empty() {
                "missing content-type".to_string()
            } else {
                content_type
            };
            return Err(FetchError::UnsupportedContent(label));
        }

        let html = response
            .text()
            .await
            .map_err(|e| FetchError::from_transport(e, url))?;

        PageSnapshot::new(final_url, status, headers, html)
    }

    /// Agentic path: scoped browser session, navigate, run the setup
    /// sequence, capture. The session is closed on every exit.
    async fn fetch_agentic(&self, url: &str, instructions: &[String]) -> Result<PageSnapshot> {
        info!(url, steps = instructions.len(), "fetching with browser setup");
        let session = self.launcher.launch(&self.config.browser).await?;
        let result = self.run_in_session(session.as_ref(), url, instructions).await;
        if let Err(e) = session.close().await {
            warn!("Failed to close browser session: {}", e);
        }
        result
    }

    async fn run_in_session(
        &self,
        session: &dyn BrowserSession,
        url: &str,
        instructions: &[String],
    ) -> Result<PageSnapshot> {
        let page = session.new_page().await?;
        page.navigate(url).await?;

        if let Some(response) = page.navigation_response().await? {
            if response.status_code >= 400 {
                return Err(FetchError::HttpError(response.status_code));
            }
        }
        page.wait_for_network_idle().await?;

        let policy = if self.config.fetcher.fail_fast {
            FailurePolicy::FailFast
        } else {
            FailurePolicy::SkipInstruction
        };
        let executor = Executor::new(self.config.browser.clone());
        let orchestrator = Orchestrator::new(Arc::clone(&self.llm), executor, policy);
        orchestrator.run(instructions, page.as_ref()).await?;

        self.capture(page.as_ref()).await
    }

    /// Read the post-setup page state and assemble the snapshot.
    ///
    /// The navigation response is re-read here so that status and headers
    /// belong to the document actually captured; a `navigate` setup action
    /// replaces the response recorded by the initial navigation.
    async fn capture(&self, page: &dyn PageHandle) -> Result<PageSnapshot> {
        let final_url = page.current_url().await?;
        let html = page.content().await?;
        let (status_code, headers) = match page.navigation_response().await? {
            Some(response) => (response.status_code, response.headers),
            None => {
                debug!("no navigation response captured, defaulting status to 200");
                (200, PageHeaders::new())
            }
        };
        PageSnapshot::new(final_url, status_code, headers, html)
    }
}
