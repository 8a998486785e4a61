//! Data models for the cost watcher

mod spend;

pub use spend::*;
