//! Configuration management for Pagescout
//!
//! Supports environment variables, config files, and runtime overrides.
//! All client state is explicit: the LLM key/endpoint/model and every timeout
//! live here and are passed into the façade and interpreter at construction.
//!
//! Config file location: ~/.config/pagescout/config.toml

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::core::error::{FetchError, Result};

/// Main configuration for Pagescout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Language model configuration
    pub llm: LlmConfig,
    /// Browser configuration
    pub browser: BrowserConfig,
    /// Fetcher configuration
    pub fetcher: FetcherConfig,
}

/// Language model endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// API key for the model endpoint
    pub api_key: String,
    /// Base endpoint URL
    pub base_url: String,
    /// Model name
    pub model: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

/// Browser automation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// Whether to run in headed mode (visible browser)
    pub headed: bool,
    /// Navigation timeout in seconds
    pub navigation_timeout_secs: u64,
    /// Per-strategy timeout for element targeting in ms
    pub action_timeout_ms: u64,
    /// How long to wait for the network to settle after click/navigate, in ms
    pub network_idle_ms: u64,
}

/// Fetch behavior configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetcherConfig {
    /// Request timeout for the plain (non-agentic) path in seconds
    pub request_timeout_secs: u64,
    /// User-Agent sent on the plain path
    pub user_agent: String,
    /// Whether a failed setup instruction aborts the fetch (true) or is
    /// skipped (false)
    pub fail_fast: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm: LlmConfig::default(),
            browser: BrowserConfig::default(),
            fetcher: FetcherConfig::default(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: env::var("GEMINI_API_KEY").unwrap_or_default(),
            base_url: env::var("PAGESCOUT_LLM_URL").unwrap_or_else(|_| {
                "https://generativelanguage.googleapis.com/v1beta".to_string()
            }),
            model: env::var("PAGESCOUT_LLM_MODEL")
                .unwrap_or_else(|_| "gemini-2.5-flash".to_string()),
            timeout_secs: 60,
        }
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headed: env::var("PAGESCOUT_HEADED")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
            navigation_timeout_secs: 30,
            action_timeout_ms: 5000,
            network_idle_ms: 2000,
        }
    }
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 30,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
                         AppleWebKit/537.36 (KHTML, like Gecko) \
                         Chrome/120.0.0.0 Safari/537.36"
                .to_string(),
            fail_fast: env::var("PAGESCOUT_FAIL_FAST")
                .map(|v| v != "false" && v != "0")
                .unwrap_or(true),
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("pagescout")
    }

    /// Get the config file path
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Load configuration from file, environment, and defaults
    /// Priority: CLI args > env vars > config file > defaults
    pub fn load() -> Self {
        // Try to load .env file if it exists
        let _ = dotenvy::dotenv();

        if let Ok(config) = Self::load_from_file() {
            return config;
        }

        // Fall back to defaults (which respect env vars)
        Self::default()
    }

    /// Load configuration from file only
    pub fn load_from_file() -> Result<Self> {
        let config_path = Self::config_file();

        if !config_path.exists() {
            return Err(FetchError::config("Config file not found"));
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|e| FetchError::config(format!("Failed to read config: {}", e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| FetchError::config(format!("Failed to parse config: {}", e)))?;

        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let config_dir = Self::config_dir();
        let config_path = Self::config_file();

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .map_err(|e| FetchError::config(format!("Failed to create config dir: {}", e)))?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| FetchError::config(format!("Failed to serialize config: {}", e)))?;

        fs::write(&config_path, content)
            .map_err(|e| FetchError::config(format!("Failed to write config: {}", e)))?;

        Ok(())
    }
}

impl BrowserConfig {
    /// Navigation timeout as a Duration
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }

    /// Per-strategy element targeting timeout as a Duration
    pub fn action_timeout(&self) -> Duration {
        Duration::from_millis(self.action_timeout_ms)
    }

    /// Network-idle settle window as a Duration
    pub fn network_idle(&self) -> Duration {
        Duration::from_millis(self.network_idle_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.browser.navigation_timeout_secs, 30);
        assert_eq!(config.browser.action_timeout_ms, 5000);
        assert!(config.fetcher.user_agent.contains("Mozilla"));
        assert_eq!(config.llm.model, "gemini-2.5-flash");
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("navigation_timeout_secs"));
        assert!(toml_str.contains("base_url"));
    }

    #[test]
    fn test_config_dir() {
        let dir = Config::config_dir();
        assert!(dir.to_string_lossy().contains("pagescout"));
    }
}
