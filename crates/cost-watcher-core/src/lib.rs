//! # Cost Watcher
//!
//! Near-real-time cloud spend alerts.
//!
//! The watcher pulls spend events from a source, compares each event's cost
//! against a single threshold and posts an alert to one notification channel
//! for every event at or above it.
//!
//! ## Architecture
//!
//! - **Source**: produces spend events until exhausted (JSON lines, channels, fixed lists)
//! - **Alerting**: the [`AlertLoop`](alerting::AlertLoop) and notification sinks (Slack, log)
//! - **Config**: layered file and environment configuration
//!
//! ## Quick Start
//!
//! ```bash
//! # Alert #alerts for any event costing $100 or more
//! cost-watcher watch --input spend.jsonl --threshold 100
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod alerting;
pub mod config;
pub mod error;
pub mod models;
pub mod source;

pub use config::Config;
pub use error::{Error, Result};

/// Re-exports for convenience
pub mod prelude {
    pub use crate::alerting::{AlertLoop, LogNotifier, NotificationSink, SlackNotifier};
    pub use crate::config::Config;
    pub use crate::error::{Error, Result};
    pub use crate::models::*;
    pub use crate::source::{ChannelSource, EventSource, JsonLinesSource, SourceError, VecSource};
}
