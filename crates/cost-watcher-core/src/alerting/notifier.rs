//! Notification delivery for alerts

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::SlackConfig;

/// Delivers a finished alert message to a named channel
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Deliver one message. Implementations must not retry on their own.
    async fn post(&self, channel: &str, message: &str) -> Result<(), NotificationError>;
}

#[async_trait]
impl<N: NotificationSink + ?Sized> NotificationSink for Box<N> {
    async fn post(&self, channel: &str, message: &str) -> Result<(), NotificationError> {
        (**self).post(channel, message).await
    }
}

#[async_trait]
impl<N: NotificationSink + ?Sized> NotificationSink for Arc<N> {
    async fn post(&self, channel: &str, message: &str) -> Result<(), NotificationError> {
        (**self).post(channel, message).await
    }
}

/// Notification errors
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    /// The request never got a response (connect, TLS, timeout)
    #[error("HTTP error: {0}")]
    Http(String),

    /// The service answered with a non-success status
    #[error("{service} rejected the notification with {status}: {body}")]
    Rejected {
        /// Service that rejected the message
        service: &'static str,
        /// HTTP status code
        status: u16,
        /// Response body, empty if unreadable
        body: String,
    },

    /// The notifier is missing settings it needs
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Posts alerts to a Slack incoming webhook
#[derive(Debug, Clone)]
pub struct SlackNotifier {
    client: Client,
    webhook_url: String,
    username: Option<String>,
}

impl SlackNotifier {
    /// Create a notifier for the given webhook URL
    pub fn new(webhook_url: impl Into<String>, timeout: Duration) -> Result<Self, NotificationError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NotificationError::Config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            webhook_url: webhook_url.into(),
            username: None,
        })
    }

    /// Create a notifier from the `[slack]` configuration section
    pub fn from_config(config: &SlackConfig) -> Result<Self, NotificationError> {
        let webhook_url = config
            .webhook_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| NotificationError::Config("slack.webhook_url is not set".to_string()))?;

        let notifier = Self::new(webhook_url, config.timeout)?;
        Ok(notifier.with_username(config.username.clone()))
    }

    /// Set the display name Slack shows for the bot
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        let username = username.into();
        self.username = (!username.is_empty()).then_some(username);
        self
    }
}

#[async_trait]
impl NotificationSink for SlackNotifier {
    async fn post(&self, channel: &str, message: &str) -> Result<(), NotificationError> {
        let payload = SlackPayload {
            channel,
            text: message,
            username: self.username.as_deref(),
        };

        let response = self
            .client
            .post(&self.webhook_url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| NotificationError::Http(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(NotificationError::Rejected {
                service: "Slack",
                status,
                body,
            });
        }

        info!(channel = %channel, "Slack notification sent");
        Ok(())
    }
}

/// Writes alerts to the log instead of sending them anywhere
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl LogNotifier {
    /// Create a new log notifier
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NotificationSink for LogNotifier {
    async fn post(&self, channel: &str, message: &str) -> Result<(), NotificationError> {
        warn!(channel = %channel, alert = %message, "Cost alert");
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct SlackPayload<'a> {
    channel: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    username: Option<&'a str>,
}
