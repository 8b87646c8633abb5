//! Channel configuration.

use pricewatch_scheduler::Audience;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Bot API flavour. Both speak the same `sendMessage` shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelKind {
    Telegram,
    Bale,
}

impl ChannelKind {
    pub fn default_base_url(&self) -> &'static str {
        match self {
            Self::Telegram => "https://api.telegram.org",
            Self::Bale => "https://tapi.bale.ai",
        }
    }
}

/// One outbound chat channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// Name used in logs, metrics and the journal.
    pub name: String,
    pub kind: ChannelKind,
    /// Overrides the kind's default API host.
    #[serde(default)]
    pub base_url: Option<String>,
    /// Bot token, usually supplied through the environment.
    #[serde(default)]
    pub token: String,
    pub chat_id: String,
    #[serde(default = "default_audience")]
    pub audience: Audience,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_audience() -> Audience {
    Audience::Subscribers
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_enabled() -> bool {
    true
}

impl ChannelConfig {
    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.kind.default_base_url())
            .trim_end_matches('/')
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("channel name must not be empty".to_string());
        }
        if !self.enabled {
            return Ok(());
        }
        if self.token.trim().is_empty() {
            return Err(format!("channel '{}': token is required", self.name));
        }
        if self.chat_id.trim().is_empty() {
            return Err(format!("channel '{}': chat_id is required", self.name));
        }
        if self.request_timeout_secs == 0 {
            return Err(format!(
                "channel '{}': request_timeout_secs must be positive",
                self.name
            ));
        }
        Ok(())
    }
}
