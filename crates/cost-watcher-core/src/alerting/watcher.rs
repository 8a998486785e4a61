//! Threshold alert loop
//!
//! Pulls spend events from a source one at a time and posts an alert for
//! every event whose cost is at or above the threshold. The loop stops on
//! exhaustion (success), cancellation, a fetch failure or a delivery failure.
//! Nothing is retried.

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::WatcherConfig;
use crate::error::{Error, Result};
use crate::models::SpendEvent;
use crate::source::{EventSource, SourceError};

use super::notifier::NotificationSink;

/// Watches a stream of spend events against a single threshold
#[derive(Debug, Clone, PartialEq)]
pub struct AlertLoop {
    channel: String,
    threshold: f64,
}

impl AlertLoop {
    /// Create a loop that alerts `channel` when a cost reaches `threshold`
    pub fn new(channel: impl Into<String>, threshold: f64) -> Self {
        Self {
            channel: channel.into(),
            threshold,
        }
    }

    /// Create a loop from the `[watcher]` configuration section
    pub fn from_config(config: &WatcherConfig) -> Self {
        Self::new(config.channel.clone(), config.threshold)
    }

    /// Destination channel for alerts
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Cost at or above which an alert is sent
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Whether an event warrants an alert (inclusive comparison on the raw cost)
    pub fn qualifies(&self, event: &SpendEvent) -> bool {
        event.cost >= self.threshold
    }

    /// Run until the source is exhausted, an error occurs or `cancel` fires.
    ///
    /// Returns `Ok(())` only on exhaustion. Cancellation is checked at the top
    /// of every iteration and passed into the fetch; a delivery already in
    /// flight always finishes before cancellation is noticed.
    pub async fn run<S, N>(&self, cancel: &CancellationToken, source: &mut S, sink: &N) -> Result<()>
    where
        S: EventSource + ?Sized,
        N: NotificationSink + ?Sized,
    {
        info!(
            channel = %self.channel,
            threshold = self.threshold,
            "Alert loop started"
        );

        let mut events: u64 = 0;
        let mut alerts: u64 = 0;

        loop {
            if cancel.is_cancelled() {
                info!(events, alerts, "Alert loop cancelled");
                return Err(Error::Cancelled);
            }

            let event = match source.next(cancel).await {
                Ok(event) => event,
                Err(SourceError::Exhausted) => {
                    info!(events, alerts, "Event source exhausted, alert loop stopped");
                    return Ok(());
                }
                Err(SourceError::Cancelled) => {
                    info!(events, alerts, "Fetch cancelled, alert loop stopped");
                    return Err(Error::Cancelled);
                }
                Err(e) => {
                    warn!(error = %e, events, alerts, "Event source failed");
                    return Err(Error::Source(e));
                }
            };

            events += 1;
            metrics::counter!("cost_watcher_events_total").increment(1);

            let qualifies = self.qualifies(&event);
            debug!(
                service = %event.service,
                cost = event.cost,
                threshold = self.threshold,
                qualifies,
                "Evaluated spend event"
            );

            if !qualifies {
                continue;
            }

            let message = event.alert_message();
            if let Err(e) = sink.post(&self.channel, &message).await {
                metrics::counter!("cost_watcher_delivery_failures_total").increment(1);
                warn!(
                    error = %e,
                    channel = %self.channel,
                    service = %event.service,
                    "Alert delivery failed"
                );
                return Err(Error::Delivery(e));
            }

            alerts += 1;
            metrics::counter!("cost_watcher_alerts_total").increment(1);
            info!(
                channel = %self.channel,
                service = %event.service,
                cost = event.cost,
                "Cost alert delivered"
            );
        }
    }
}
