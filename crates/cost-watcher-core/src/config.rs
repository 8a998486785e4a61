//! Configuration management for the cost watcher
//!
//! Values are layered: built-in defaults, then an optional TOML file, then
//! `COST_WATCHER_*` environment variables (`__` separates sections, e.g.
//! `COST_WATCHER_WATCHER__THRESHOLD=250`).

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Environment variable prefix for overrides
pub const ENV_PREFIX: &str = "COST_WATCHER";

/// Config file looked up in the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "cost-watcher.toml";

/// Main configuration struct
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Threshold and destination channel
    pub watcher: WatcherConfig,

    /// Slack delivery configuration
    pub slack: SlackConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from defaults, a config file and the environment.
    ///
    /// An explicit `path` must exist; otherwise `cost-watcher.toml` is used
    /// when present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) => ::config::File::from(path).required(true),
            None => ::config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let config: Self = ::config::Config::builder()
            .add_source(file)
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Check values that serde cannot
    pub fn validate(&self) -> Result<()> {
        self.watcher.validate()?;

        if self.slack.timeout.is_zero() {
            return Err(Error::config("slack.timeout must be greater than zero"));
        }

        if self
            .slack
            .webhook_url
            .as_deref()
            .is_some_and(|url| url.trim().is_empty())
        {
            return Err(Error::config(
                "slack.webhook_url is empty; remove it to log alerts instead",
            ));
        }

        match self.logging.format.as_str() {
            "pretty" | "json" => Ok(()),
            other => Err(Error::config(format!(
                "logging.format must be \"pretty\" or \"json\", got {other:?}"
            ))),
        }
    }
}

/// Alert loop configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatcherConfig {
    /// Channel alerts are posted to
    pub channel: String,
    /// Cost (in dollars) at or above which an alert is sent
    pub threshold: f64,
}

impl WatcherConfig {
    fn validate(&self) -> Result<()> {
        if self.channel.trim().is_empty() {
            return Err(Error::config("watcher.channel must not be empty"));
        }
        if !self.threshold.is_finite() || self.threshold < 0.0 {
            return Err(Error::config(format!(
                "watcher.threshold must be a non-negative number, got {}",
                self.threshold
            )));
        }
        Ok(())
    }
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            channel: "#alerts".to_string(),
            threshold: 100.0,
        }
    }
}

/// Slack configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlackConfig {
    /// Incoming webhook URL; alerts are only logged when unset
    pub webhook_url: Option<String>,
    /// Bot display name
    pub username: String,
    /// Request timeout
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for SlackConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            username: "finance-cost-watcher".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level
    pub level: String,
    /// Log format (json or pretty)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
