//! Pagescout - Agentic Page Fetcher
//!
//! Captures page snapshots for downstream QA analysis. Pages that need no
//! preparation are fetched over plain HTTP; pages that must be brought into
//! a particular state first (logged in, banner dismissed) are prepared in a
//! headless browser driven by free-text setup instructions, which a language
//! model translates into concrete browser actions.
//!
//! # Architecture
//!
//! - **Core**: Shared types, configuration, and error handling
//! - **LLM**: Model client abstraction with a Gemini implementation
//! - **Browser**: Page/session seams and the headless Chrome driver
//! - **Setup**: Vocabulary, interpreter, executor, and orchestrator
//! - **Fetcher**: The fetch façade (fast HTTP path + agentic path)
//! - **Analyze**: Dimension calculator seam with concurrent dispatch
//!
//! # Usage
//!
//! ```rust,no_run
//! use pagescout::{Config, PageFetcher};
//!
//! #[tokio::main]
//! async fn main() {
//!     let fetcher = PageFetcher::new(Config::load()).unwrap();
//!     let setup = vec!["Dismiss the cookie banner".to_string()];
//!     let snapshot = fetcher.fetch("https://example.com", &setup).await.unwrap();
//!     println!("{} ({})", snapshot.url, snapshot.status_code);
//! }
//! ```

pub mod analyze;
pub mod browser;
pub mod core;
pub mod fetcher;
pub mod llm;
pub mod setup;

// Re-export commonly used items
pub use crate::core::{Config, FetchError, PageHeaders, PageSnapshot, Result};
pub use crate::fetcher::PageFetcher;
