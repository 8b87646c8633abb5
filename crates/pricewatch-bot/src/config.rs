//! Application configuration.
//!
//! Loaded from a TOML file layered with `PRICEWATCH__`-prefixed
//! environment variables (`PRICEWATCH__FEED__API_KEY` sets `feed.api_key`).
//! Channel tokens come from `PRICEWATCH_CHANNEL_<NAME>_TOKEN` when the file
//! leaves them empty.

use crate::error::{AppError, AppResult};
use config::{Config, Environment, File, FileFormat};
use pricewatch_feed::FeedConfig;
use pricewatch_notify::ChannelConfig;
use pricewatch_scheduler::{CalendarConfig, SchedulerConfig};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

/// Optional on-disk state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// Scheduling state snapshot. Without it once-per-day notices repeat
    /// after a restart.
    #[serde(default)]
    pub state_path: Option<PathBuf>,
    /// Directory for the daily notice journal.
    #[serde(default)]
    pub journal_dir: Option<PathBuf>,
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub calendar: CalendarConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub channels: Vec<ChannelConfig>,
    #[serde(default)]
    pub persistence: PersistenceConfig,
    /// Interval of the counter summary in the log.
    #[serde(default = "default_stats_interval_secs")]
    pub stats_interval_secs: u64,
}

fn default_stats_interval_secs() -> u64 {
    3600
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            calendar: CalendarConfig::default(),
            scheduler: SchedulerConfig::default(),
            feed: FeedConfig::default(),
            channels: Vec::new(),
            persistence: PersistenceConfig::default(),
            stats_interval_secs: default_stats_interval_secs(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file and the environment.
    pub fn load(path: &str) -> AppResult<Self> {
        let settings = Config::builder()
            .add_source(File::new(path, FileFormat::Toml))
            .add_source(Environment::with_prefix("PRICEWATCH").separator("__"))
            .build()
            .map_err(|e| AppError::Config(format!("Failed to load config: {e}")))?;

        let mut config: Self = settings
            .try_deserialize()
            .map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))?;
        config.apply_channel_tokens(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Parse configuration from TOML text, without environment overrides.
    pub fn from_toml_str(content: &str) -> AppResult<Self> {
        toml::from_str(content).map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))
    }

    /// Fill empty channel tokens from `PRICEWATCH_CHANNEL_<NAME>_TOKEN`.
    pub fn apply_channel_tokens(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        for channel in &mut self.channels {
            if !channel.token.trim().is_empty() {
                continue;
            }
            if let Some(token) = lookup(&channel_token_var(&channel.name)) {
                channel.token = token;
            }
        }
    }

    pub fn stats_interval(&self) -> Duration {
        Duration::from_secs(self.stats_interval_secs)
    }

    pub fn enabled_channels(&self) -> impl Iterator<Item = &ChannelConfig> {
        self.channels.iter().filter(|c| c.enabled)
    }

    /// Validate everything except channel credentials.
    ///
    /// Enough for a dry run, where nothing is sent.
    pub fn validate_settings(&self) -> AppResult<()> {
        self.scheduler
            .validate()
            .map_err(|e| AppError::Config(e.to_string()))?;
        self.calendar
            .clock()
            .and_then(|_| self.calendar.holiday_calendar())
            .map_err(|e| AppError::Config(format!("calendar: {e}")))?;
        self.feed.validate().map_err(AppError::Config)?;

        if self.stats_interval_secs == 0 {
            return Err(AppError::Config(
                "stats_interval_secs must be positive".to_string(),
            ));
        }

        let mut names = HashSet::new();
        for channel in &self.channels {
            if channel.name.trim().is_empty() {
                return Err(AppError::Config(
                    "channel name must not be empty".to_string(),
                ));
            }
            if !names.insert(channel.name.as_str()) {
                return Err(AppError::Config(format!(
                    "duplicate channel name '{}'",
                    channel.name
                )));
            }
        }
        Ok(())
    }

    /// Validate the full configuration before the loop starts.
    pub fn validate(&self) -> AppResult<()> {
        self.validate_settings()?;
        if self.enabled_channels().next().is_none() {
            return Err(AppError::Config(
                "at least one enabled channel is required".to_string(),
            ));
        }
        for channel in &self.channels {
            channel.validate().map_err(AppError::Config)?;
        }
        Ok(())
    }
}

/// `telegram-main` -> `PRICEWATCH_CHANNEL_TELEGRAM_MAIN_TOKEN`.
fn channel_token_var(name: &str) -> String {
    let normalized: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect();
    format!("PRICEWATCH_CHANNEL_{normalized}_TOKEN")
}
