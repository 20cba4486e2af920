// src/outage/mod.rs
pub mod extract;
pub mod fetch;
pub mod source;
pub mod types;

pub use extract::{parse_outage_table, TableMarkers};
pub use fetch::{FetchError, FetchOptions, PageFetcher};
pub use source::{extract, PageSource};
pub use types::{OutageBatch, OutageRecord, OutageSource};
