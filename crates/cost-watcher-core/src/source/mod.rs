//! Event sources - where spend events come from
//!
//! A source hands out one [`SpendEvent`] per call and reports the end of the
//! stream with the designated [`SourceError::Exhausted`] value. The
//! cancellation token is passed into every fetch so a source that is waiting
//! on upstream data can give up early.

mod json_lines;
mod memory;

pub use json_lines::JsonLinesSource;
pub use memory::{ChannelSource, VecSource};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::models::SpendEvent;

/// Errors an event source can return
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// No more events; normal end of stream
    #[error("event source exhausted")]
    Exhausted,

    /// The fetch was abandoned because cancellation was requested
    #[error("fetch cancelled")]
    Cancelled,

    /// Reading from the underlying stream failed
    #[error("IO error while reading events")]
    Io(#[from] std::io::Error),

    /// A line could not be decoded as a spend event
    #[error("line {line}: malformed spend event")]
    Decode {
        /// 1-based line number in the input
        line: usize,
        /// Decoder error
        #[source]
        source: serde_json::Error,
    },

    /// A line decoded but its values are unusable
    #[error("line {line}: invalid spend event: {reason}")]
    InvalidEvent {
        /// 1-based line number in the input
        line: usize,
        /// What is wrong with the event
        reason: String,
    },

    /// Failure reported by an upstream system
    #[error("upstream error: {0}")]
    Upstream(String),
}

impl SourceError {
    /// True for the designated end-of-stream value
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted)
    }
}

/// Something that produces spend events one at a time
#[async_trait]
pub trait EventSource: Send {
    /// Fetch the next event, or `SourceError::Exhausted` once there are none left
    async fn next(&mut self, cancel: &CancellationToken) -> Result<SpendEvent, SourceError>;
}

#[async_trait]
impl<S: EventSource + ?Sized> EventSource for Box<S> {
    async fn next(&mut self, cancel: &CancellationToken) -> Result<SpendEvent, SourceError> {
        (**self).next(cancel).await
    }
}
