//! Core module - shared types, configuration, and error handling

pub mod config;
pub mod error;
pub mod snapshot;

pub use config::{BrowserConfig, Config, FetcherConfig, LlmConfig};
pub use error::{FetchError, Result};
pub use snapshot::{PageHeaders, PageSnapshot};
