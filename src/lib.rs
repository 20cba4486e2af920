// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod config;
pub mod humanize;
pub mod metrics;
pub mod notify;
pub mod outage;
pub mod watch;

// ---- Re-exports for stable public API ----
pub use crate::notify::{Notifier, NotifierMux, OutageNotice};
pub use crate::outage::{extract, parse_outage_table, FetchError, OutageBatch, OutageRecord};
pub use crate::watch::{RunMode, WatchError, WatchPolicy, Watcher};
