//! In-process event sources

use std::collections::VecDeque;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::{EventSource, SourceError};
use crate::models::SpendEvent;

/// Replays a fixed list of events, then reports exhaustion
#[derive(Debug, Clone, Default)]
pub struct VecSource {
    events: VecDeque<SpendEvent>,
}

impl VecSource {
    /// Create a source over the given events
    pub fn new(events: impl IntoIterator<Item = SpendEvent>) -> Self {
        Self {
            events: events.into_iter().collect(),
        }
    }

    /// Number of events not yet handed out
    pub fn remaining(&self) -> usize {
        self.events.len()
    }
}

impl From<Vec<SpendEvent>> for VecSource {
    fn from(events: Vec<SpendEvent>) -> Self {
        Self::new(events)
    }
}

#[async_trait]
impl EventSource for VecSource {
    async fn next(&mut self, cancel: &CancellationToken) -> Result<SpendEvent, SourceError> {
        if cancel.is_cancelled() {
            return Err(SourceError::Cancelled);
        }
        self.events.pop_front().ok_or(SourceError::Exhausted)
    }
}

/// Receives events pushed by another task.
///
/// The stream is exhausted once every sender has been dropped and the
/// buffer is drained.
#[derive(Debug)]
pub struct ChannelSource {
    rx: mpsc::Receiver<SpendEvent>,
}

impl ChannelSource {
    /// Wrap an existing receiver
    pub fn new(rx: mpsc::Receiver<SpendEvent>) -> Self {
        Self { rx }
    }

    /// Create a bounded channel and the source reading from it
    pub fn channel(buffer: usize) -> (mpsc::Sender<SpendEvent>, Self) {
        let (tx, rx) = mpsc::channel(buffer);
        (tx, Self::new(rx))
    }
}

#[async_trait]
impl EventSource for ChannelSource {
    async fn next(&mut self, cancel: &CancellationToken) -> Result<SpendEvent, SourceError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(SourceError::Cancelled),
            event = self.rx.recv() => event.ok_or(SourceError::Exhausted),
        }
    }
}
