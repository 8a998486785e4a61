//! Alerting for the cost watcher
//!
//! Provides the threshold alert loop and notification delivery.

mod notifier;
mod watcher;

pub use notifier::{LogNotifier, NotificationError, NotificationSink, SlackNotifier};
pub use watcher::AlertLoop;
