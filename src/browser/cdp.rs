//! Headless Chrome driver
//!
//! Implements the page/session seams on top of chromiumoxide (CDP-native,
//! async). One session owns one Chrome process and the handler task pumping
//! DevTools messages; the session is launched per fetch call and released on
//! every exit path.

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig as CdpBrowserConfig};
use chromiumoxide::cdp::browser_protocol::network::EventResponseReceived;
use chromiumoxide::Page;
use futures::StreamExt;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::browser::page::{
    BrowserLauncher, BrowserSession, NavigationResponse, PageHandle, ScrollDirection, Target,
};
use crate::core::{BrowserConfig, FetchError, PageHeaders, Result};

/// Launches headless Chrome sessions
#[derive(Debug, Default, Clone)]
pub struct CdpLauncher;

/// One running Chrome process
pub struct CdpSession {
    browser: Mutex<Browser>,
    handler_task: JoinHandle<()>,
    config: BrowserConfig,
}

/// One Chrome tab
pub struct CdpPage {
    page: Page,
    config: BrowserConfig,
    last_response: Mutex<Option<NavigationResponse>>,
}

#[async_trait]
impl BrowserLauncher for CdpLauncher {
    async fn launch(&self, config: &BrowserConfig) -> Result<Box<dyn BrowserSession>> {
        let mut builder = CdpBrowserConfig::builder()
            .no_sandbox()
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .window_size(1280, 720);

        if config.headed {
            builder = builder.with_head();
        }

        let cdp_config = builder
            .build()
            .map_err(|e| FetchError::browser(format!("Failed to build browser config: {}", e)))?;

        debug!("Launching headless Chrome");
        let (browser, mut handler) = Browser::launch(cdp_config)
            .await
            .map_err(|e| FetchError::browser(format!("Failed to launch browser: {}", e)))?;

        // Pump DevTools protocol messages until the browser goes away.
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    debug!("CDP handler event loop ended");
                    break;
                }
            }
        });

        Ok(Box::new(CdpSession {
            browser: Mutex::new(browser),
            handler_task,
            config: config.clone(),
        }))
    }
}

#[async_trait]
impl BrowserSession for CdpSession {
    async fn new_page(&self) -> Result<Box<dyn PageHandle>> {
        let page = self
            .browser
            .lock()
            .await
            .new_page("about:blank")
            .await
            .map_err(|e| FetchError::browser(format!("Failed to create page: {}", e)))?;

        Ok(Box::new(CdpPage {
            page,
            config: self.config.clone(),
            last_response: Mutex::new(None),
        }))
    }

    async fn close(&self) -> Result<()> {
        let mut browser = self.browser.lock().await;
        if let Err(e) = browser.close().await {
            warn!("Error closing browser: {}", e);
        }
        self.handler_task.abort();
        Ok(())
    }
}

impl CdpPage {
    /// Evaluate a JS expression expected to produce a boolean
    async fn eval_bool(&self, js: String) -> Result<bool> {
        let result = self
            .page
            .evaluate(js)
            .await
            .map_err(|e| FetchError::browser(format!("Script evaluation failed: {}", e)))?;
        Ok(result.into_value::<bool>().unwrap_or(false))
    }

    /// JS expression resolving the target to an element (or null)
    fn target_expr(target: &Target) -> String {
        match target {
            Target::Css(selector) => format!("document.querySelector({})", js_str(selector)),
            Target::Script(expr) => expr.clone(),
        }
    }
}

#[async_trait]
impl PageHandle for CdpPage {
    async fn navigate(&self, url: &str) -> Result<()> {
        let mut responses = self
            .page
            .event_listener::<EventResponseReceived>()
            .await
            .map_err(|e| {
                FetchError::browser(format!("Failed to subscribe to network events: {}", e))
            })?;

        match tokio::time::timeout(self.config.navigation_timeout(), self.page.goto(url)).await {
            Err(_) => return Err(FetchError::Timeout(url.to_string())),
            Ok(Err(e)) => return Err(classify_navigation_error(&e.to_string(), url)),
            Ok(Ok(_)) => {}
        }

        // The main-document response event is buffered once goto returns;
        // drain briefly and keep the entry for the requested URL, falling
        // back to the first response seen.
        let mut captured: Option<NavigationResponse> = None;
        for _ in 0..5 {
            match tokio::time::timeout(Duration::from_millis(100), responses.next()).await {
                Ok(Some(event)) => {
                    let event_url = event.response.url.trim_end_matches('/');
                    let is_document = event_url == url.trim_end_matches('/');
                    if captured.is_none() || is_document {
                        captured = Some(NavigationResponse {
                            status_code: event.response.status as u16,
                            headers: headers_from_cdp(event.response.headers.inner()),
                        });
                    }
                    if is_document {
                        break;
                    }
                }
                _ => break,
            }
        }

        *self.last_response.lock().await = captured;
        Ok(())
    }

    async fn wait_for_network_idle(&self) -> Result<()> {
        // Bounded settle window after interactions that may trigger requests.
        tokio::time::sleep(self.config.network_idle()).await;
        Ok(())
    }

    async fn click(&self, target: &Target) -> Result<bool> {
        match target {
            Target::Css(selector) => {
                let element = match self.page.find_element(selector.as_str()).await {
                    Ok(el) => el,
                    Err(_) => return Ok(false),
                };
                Ok(element.click().await.is_ok())
            }
            Target::Script(_) => {
                let expr = Self::target_expr(target);
                self.eval_bool(format!(
                    "(() => {{ const el = {expr}; if (!el) return false; el.click(); return true; }})()"
                ))
                .await
            }
        }
    }

    async fn fill(&self, target: &Target, value: &str) -> Result<bool> {
        match target {
            Target::Css(selector) => {
                let element = match self.page.find_element(selector.as_str()).await {
                    Ok(el) => el,
                    Err(_) => return Ok(false),
                };
                if element.click().await.is_err() {
                    return Ok(false);
                }
                Ok(element.type_str(value).await.is_ok())
            }
            Target::Script(_) => {
                let expr = Self::target_expr(target);
                let value = js_str(value);
                self.eval_bool(format!(
                    "(() => {{ const el = {expr}; if (!el) return false; el.focus(); \
                     el.value = {value}; \
                     el.dispatchEvent(new Event('input', {{bubbles: true}})); \
                     el.dispatchEvent(new Event('change', {{bubbles: true}})); \
                     return true; }})()"
                ))
                .await
            }
        }
    }

    async fn select_option(&self, target: &Target, value: &str) -> Result<bool> {
        let expr = Self::target_expr(target);
        let value = js_str(value);
        self.eval_bool(format!(
            "(() => {{ const el = {expr}; if (!el) return false; el.value = {value}; \
             el.dispatchEvent(new Event('change', {{bubbles: true}})); \
             return el.value === {value}; }})()"
        ))
        .await
    }

    async fn hover(&self, target: &Target) -> Result<bool> {
        let expr = Self::target_expr(target);
        self.eval_bool(format!(
            "(() => {{ const el = {expr}; if (!el) return false; \
             el.dispatchEvent(new MouseEvent('mouseover', {{bubbles: true}})); \
             return true; }})()"
        ))
        .await
    }

    async fn press_key(&self, key: &str) -> Result<()> {
        let element = self
            .page
            .find_element("body")
            .await
            .map_err(|e| FetchError::browser(format!("No body element to receive key: {}", e)))?;
        element
            .press_key(key)
            .await
            .map_err(|e| FetchError::browser(format!("Key press '{}' failed: {}", key, e)))?;
        Ok(())
    }

    async fn exists(&self, target: &Target) -> Result<bool> {
        match target {
            Target::Css(selector) => Ok(self.page.find_element(selector.as_str()).await.is_ok()),
            Target::Script(_) => {
                let expr = Self::target_expr(target);
                self.eval_bool(format!("(() => !!({expr}))()")).await
            }
        }
    }

    async fn scroll_into_view(&self, target: &Target) -> Result<bool> {
        let expr = Self::target_expr(target);
        self.eval_bool(format!(
            "(() => {{ const el = {expr}; if (!el) return false; \
             el.scrollIntoView({{block: 'center'}}); return true; }})()"
        ))
        .await
    }

    async fn scroll(&self, direction: ScrollDirection) -> Result<()> {
        let js = match direction {
            ScrollDirection::Down => "window.scrollBy(0, window.innerHeight)",
            ScrollDirection::Up => "window.scrollBy(0, -window.innerHeight)",
            ScrollDirection::Bottom => "window.scrollTo(0, document.body.scrollHeight)",
            ScrollDirection::Top => "window.scrollTo(0, 0)",
        };
        self.page
            .evaluate(js.to_string())
            .await
            .map_err(|e| FetchError::browser(format!("Scroll failed: {}", e)))?;
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        let url = self
            .page
            .url()
            .await
            .map_err(|e| FetchError::browser(format!("Failed to read URL: {}", e)))?;
        Ok(url.unwrap_or_else(|| "about:blank".to_string()))
    }

    async fn content(&self) -> Result<String> {
        self.page
            .content()
            .await
            .map_err(|e| FetchError::browser(format!("Failed to read page HTML: {}", e)))
    }

    async fn navigation_response(&self) -> Result<Option<NavigationResponse>> {
        Ok(self.last_response.lock().await.clone())
    }
}

/// Map a CDP navigation failure onto the fetch error taxonomy
fn classify_navigation_error(message: &str, url: &str) -> FetchError {
    if message.contains("ERR_NAME_NOT_RESOLVED")
        || message.contains("ERR_CONNECTION")
        || message.contains("ERR_ADDRESS")
    {
        FetchError::Unreachable(url.to_string())
    } else if message.to_ascii_lowercase().contains("timeout") {
        FetchError::Timeout(url.to_string())
    } else {
        FetchError::browser(format!("Navigation to '{}' failed: {}", url, message))
    }
}

/// Convert the CDP header object into the snapshot header multimap.
///
/// CDP folds repeated headers into one newline-joined value; splitting on
/// newlines restores the original Set-Cookie list.
fn headers_from_cdp(raw: &serde_json::Value) -> PageHeaders {
    let mut headers = PageHeaders::new();
    if let Some(map) = raw.as_object() {
        for (name, value) in map {
            if let Some(value) = value.as_str() {
                for part in value.split('\n') {
                    if !part.is_empty() {
                        headers.append(name.clone(), part.to_string());
                    }
                }
            }
        }
    }
    headers
}

/// Quote a string for safe embedding in a JS expression
fn js_str(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| "\"\"".to_string())
}
