//! Error types for the cost watcher

use thiserror::Error;

use crate::alerting::NotificationError;
use crate::source::SourceError;

/// Result type alias using the cost watcher's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Reasons an alert loop (or the host around it) stopped
#[derive(Error, Debug)]
pub enum Error {
    /// The cancellation token fired before or during a fetch
    #[error("alert loop cancelled")]
    Cancelled,

    /// The event source failed with something other than exhaustion
    #[error("event source failure")]
    Source(#[source] SourceError),

    /// The notification sink failed to deliver an alert
    #[error("alert delivery failure")]
    Delivery(#[source] NotificationError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// True when the loop stopped because cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// True when the event source failed
    pub fn is_source_failure(&self) -> bool {
        matches!(self, Self::Source(_))
    }

    /// True when an alert could not be delivered
    pub fn is_delivery_failure(&self) -> bool {
        matches!(self, Self::Delivery(_))
    }
}

impl From<SourceError> for Error {
    /// Aborted fetches count as cancellation; everything else is kept intact.
    /// Exhaustion is handled by the loop and never reaches this conversion there.
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::Cancelled => Self::Cancelled,
            other => Self::Source(other),
        }
    }
}

impl From<NotificationError> for Error {
    fn from(err: NotificationError) -> Self {
        Self::Delivery(err)
    }
}

impl From<::config::ConfigError> for Error {
    fn from(err: ::config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_wrapped_errors_display_once() {
        let err = Error::from(SourceError::Upstream("throttled".to_string()));
        assert_eq!(err.to_string(), "event source failure");
        assert_eq!(
            err.source().map(ToString::to_string).as_deref(),
            Some("upstream error: throttled")
        );

        let err = Error::from(NotificationError::Http("connection reset".to_string()));
        assert_eq!(err.to_string(), "alert delivery failure");
        assert_eq!(
            err.source().map(ToString::to_string).as_deref(),
            Some("HTTP error: connection reset")
        );
    }

    #[test]
    fn test_cancelled_fetch_becomes_cancelled() {
        let err = Error::from(SourceError::Cancelled);
        assert!(err.is_cancelled());
        assert!(!err.is_source_failure());
    }
}
