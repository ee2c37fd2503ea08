//! Page handle abstraction
//!
//! The executor and façade drive pages through these traits rather than a
//! concrete driver, so a fetch can run against headless Chrome in production
//! and against recording doubles in tests.

use async_trait::async_trait;

use crate::core::{BrowserConfig, PageHeaders, Result};

/// A concrete element query produced by a targeting strategy.
///
/// Strategies are pure transforms from a raw selector hint to one of these;
/// the driver decides how to resolve each form.
#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    /// A CSS selector resolved via the driver's query engine
    Css(String),
    /// A JavaScript expression evaluating to an element or null
    Script(String),
}

impl Target {
    /// Human-readable form for logs and failure messages
    pub fn describe(&self) -> &str {
        match self {
            Target::Css(s) => s,
            Target::Script(s) => s,
        }
    }
}

/// Fixed viewport scroll commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    Down,
    Up,
    Bottom,
    Top,
}

impl ScrollDirection {
    /// Parse a direction hint, defaulting to Down for unrecognized values
    pub fn parse(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "up" => Self::Up,
            "bottom" => Self::Bottom,
            "top" => Self::Top,
            _ => Self::Down,
        }
    }
}

/// Status and headers of the main-document navigation response
#[derive(Debug, Clone)]
pub struct NavigationResponse {
    pub status_code: u16,
    pub headers: PageHeaders,
}

/// One live browser page.
///
/// Targeting operations return `Ok(false)` when the target did not resolve or
/// the interaction could not complete; that is a per-strategy failure, not an
/// error. `Err` is reserved for driver/protocol breakage.
#[async_trait]
pub trait PageHandle: Send + Sync {
    /// Navigate to a URL and wait for the load to complete
    async fn navigate(&self, url: &str) -> Result<()>;

    /// Wait (bounded) for in-flight network activity to settle
    async fn wait_for_network_idle(&self) -> Result<()>;

    /// Resolve the target and click it
    async fn click(&self, target: &Target) -> Result<bool>;

    /// Resolve the target and type a value into it
    async fn fill(&self, target: &Target, value: &str) -> Result<bool>;

    /// Resolve a `<select>` target and choose an option by value
    async fn select_option(&self, target: &Target, value: &str) -> Result<bool>;

    /// Resolve the target and hover over it
    async fn hover(&self, target: &Target) -> Result<bool>;

    /// Press a key on the focused element
    async fn press_key(&self, key: &str) -> Result<()>;

    /// Whether the target currently resolves to an element
    async fn exists(&self, target: &Target) -> Result<bool>;

    /// Scroll the target into view
    async fn scroll_into_view(&self, target: &Target) -> Result<bool>;

    /// Run one of the fixed viewport scroll commands
    async fn scroll(&self, direction: ScrollDirection) -> Result<()>;

    /// Current page URL
    async fn current_url(&self) -> Result<String>;

    /// Full serialized HTML of the current document
    async fn content(&self) -> Result<String>;

    /// Status and headers captured from the last navigation, if any
    async fn navigation_response(&self) -> Result<Option<NavigationResponse>>;
}

/// One launched browser owning its pages
#[async_trait]
pub trait BrowserSession: Send + Sync {
    /// Open a fresh page in this session
    async fn new_page(&self) -> Result<Box<dyn PageHandle>>;

    /// Release the browser. Called on every exit path of a fetch.
    async fn close(&self) -> Result<()>;
}

/// Factory seam for acquiring browser sessions
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    /// Launch a browser configured per `config`
    async fn launch(&self, config: &BrowserConfig) -> Result<Box<dyn BrowserSession>>;
}
