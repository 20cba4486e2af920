// src/outage/types.rs
use serde::{Deserialize, Serialize};

use super::fetch::FetchError;

/// One row of the outage table: the date cell text and the PDF notices linked from it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OutageRecord {
    pub date: String,           // as printed on the page, not normalized
    pub pdf_links: Vec<String>, // raw href values, document order, never empty
}

/// Everything extracted by a single fetch-and-parse cycle.
pub type OutageBatch = Vec<OutageRecord>;

/// A named page that can be fetched and turned into an [`OutageBatch`].
#[async_trait::async_trait]
pub trait OutageSource: Send + Sync {
    async fn fetch_batch(&self) -> Result<OutageBatch, FetchError>;
    fn name(&self) -> &str;
    fn page_url(&self) -> &str;
}
