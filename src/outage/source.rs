// src/outage/source.rs
use async_trait::async_trait;

use super::extract::{parse_outage_table, TableMarkers};
use super::fetch::{FetchError, PageFetcher};
use super::types::{OutageBatch, OutageSource};

/// A configured outage page: one entry of `outage_page_urls`.
pub struct PageSource {
    name: String,
    url: String,
    markers: TableMarkers,
    mode: Mode,
}

enum Mode {
    Http(PageFetcher),
    // Holds the page body directly; used by tests and dry runs.
    Fixture(String),
}

impl PageSource {
    pub fn from_url(
        name: impl Into<String>,
        url: impl Into<String>,
        fetcher: PageFetcher,
        markers: TableMarkers,
    ) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            markers,
            mode: Mode::Http(fetcher),
        }
    }

    pub fn from_fixture(name: impl Into<String>, html: &str) -> Self {
        Self {
            name: name.into(),
            url: String::new(),
            markers: TableMarkers::default(),
            mode: Mode::Fixture(html.to_string()),
        }
    }
}

#[async_trait]
impl OutageSource for PageSource {
    async fn fetch_batch(&self) -> Result<OutageBatch, FetchError> {
        match &self.mode {
            Mode::Fixture(html) => Ok(parse_outage_table(html, &self.markers)),
            Mode::Http(fetcher) => {
                let body = fetcher.fetch_html(&self.url).await?;
                Ok(parse_outage_table(&body, &self.markers))
            }
        }
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn page_url(&self) -> &str {
        &self.url
    }
}

/// Fetch `url` and extract its outage table with the default markers.
pub async fn extract(fetcher: &PageFetcher, url: &str) -> Result<OutageBatch, FetchError> {
    let body = fetcher.fetch_html(url).await?;
    Ok(parse_outage_table(&body, &TableMarkers::default()))
}
