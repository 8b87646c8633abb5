//! Feed configuration.

use pricewatch_core::Symbol;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the quote endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Endpoint URL, without query string.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// API key, usually supplied through the environment.
    #[serde(default)]
    pub api_key: String,
    /// Per-request HTTP timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Tracked symbols. Every snapshot covers exactly these.
    #[serde(default = "default_symbols")]
    pub symbols: Vec<Symbol>,
}

fn default_base_url() -> String {
    "https://brsapi.ir/Api/Market/Gold_Currency.php".to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_symbols() -> Vec<Symbol> {
    Symbol::ALL.to_vec()
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: String::new(),
            request_timeout_secs: default_request_timeout_secs(),
            symbols: default_symbols(),
        }
    }
}

impl FeedConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.base_url.trim().is_empty() {
            return Err("feed.base_url must not be empty".to_string());
        }
        if self.api_key.trim().is_empty() {
            return Err("feed.api_key is required (set PRICEWATCH__FEED__API_KEY)".to_string());
        }
        if self.request_timeout_secs == 0 {
            return Err("feed.request_timeout_secs must be positive".to_string());
        }
        if self.symbols.is_empty() {
            return Err("feed.symbols must list at least one symbol".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_cover_all_symbols() {
        let config = FeedConfig::default();
        assert_eq!(config.symbols.len(), Symbol::ALL.len());
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_validate_requires_api_key() {
        let mut config = FeedConfig::default();
        assert!(config.validate().unwrap_err().contains("api_key"));

        config.api_key = "secret".to_string();
        assert!(config.validate().is_ok());

        config.symbols.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_symbols_deserialize_from_codes() {
        let config: FeedConfig =
            serde_json::from_str(r#"{"api_key": "k", "symbols": ["USD", "G18K"]}"#).unwrap();
        assert_eq!(config.symbols, vec![Symbol::Usd, Symbol::Gold18k]);
    }
}
