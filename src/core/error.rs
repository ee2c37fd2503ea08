//! Custom error types for Pagescout
//!
//! Provides a unified error handling system across all modules.

use thiserror::Error;

/// Main error type for Pagescout operations
#[derive(Error, Debug)]
pub enum FetchError {
    /// DNS or connection failure while reaching the target
    #[error("Unable to reach: {0}")]
    Unreachable(String),

    /// Navigation or wait exceeded its bound
    #[error("Timeout while fetching: {0}")]
    Timeout(String),

    /// Remote returned an HTTP error status (>= 400)
    #[error("HTTP error: {0}")]
    HttpError(u16),

    /// Fast path received a non-HTML body
    #[error("Unsupported content type: {0}")]
    UnsupportedContent(String),

    /// Response body was empty after trimming
    #[error("Empty response body")]
    EmptyBody,

    /// Captured HTML could not be parsed into a structural handle
    #[error("Failed to parse DOM: {0}")]
    DomParse(String),

    /// Every targeting strategy failed for one action
    #[error("Action '{tool}' exhausted all targeting strategies for hint '{hint}'")]
    ActionExhausted { tool: String, hint: String },

    /// Language model call or response errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// Browser lifecycle or protocol errors
    #[error("Browser error: {0}")]
    Browser(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Snapshot analysis errors (unknown dimension, worker failure)
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// JSON parsing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type for Pagescout operations
pub type Result<T> = std::result::Result<T, FetchError>;

impl FetchError {
    /// Create an LLM error
    pub fn llm(msg: impl Into<String>) -> Self {
        Self::Llm(msg.into())
    }

    /// Create a browser error
    pub fn browser(msg: impl Into<String>) -> Self {
        Self::Browser(msg.into())
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an analysis error
    pub fn analysis(msg: impl Into<String>) -> Self {
        Self::Analysis(msg.into())
    }

    /// Create an action-exhausted error for a tool and its original hint
    pub fn exhausted(tool: impl Into<String>, hint: impl Into<String>) -> Self {
        Self::ActionExhausted {
            tool: tool.into(),
            hint: hint.into(),
        }
    }

    /// Classify a reqwest transport failure into the fetch taxonomy
    pub fn from_transport(err: reqwest::Error, url: &str) -> Self {
        if err.is_timeout() {
            Self::Timeout(url.to_string())
        } else if err.is_connect() {
            Self::Unreachable(url.to_string())
        } else {
            Self::Unreachable(format!("Request failed for: {url}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_error_display() {
        let err = FetchError::HttpError(404);
        assert_eq!(err.to_string(), "HTTP error: 404");
    }

    #[test]
    fn test_exhausted_carries_tool_and_hint() {
        let err = FetchError::exhausted("click", "Login");
        match err {
            FetchError::ActionExhausted { tool, hint } => {
                assert_eq!(tool, "click");
                assert_eq!(hint, "Login");
            }
            _ => panic!("Expected ActionExhausted"),
        }
    }
}
