// src/notify/webhook.rs
use anyhow::{Context, Result};
use reqwest::Client;
use serde::Serialize;

use super::{render, Notifier, OutageNotice};

/// Generic JSON webhook (`json://` / `jsons://`), Apprise payload layout.
pub struct JsonWebhookNotifier {
    url: String,
    client: Client,
}

#[derive(Serialize)]
struct ApprisePayload<'a> {
    version: &'static str,
    title: String,
    message: String,
    #[serde(rename = "type")]
    kind: &'static str,
    source: &'a str,
    records: &'a [crate::outage::OutageRecord],
}

impl JsonWebhookNotifier {
    pub fn new(url: String, client: Client) -> Self {
        Self { url, client }
    }
}

#[async_trait::async_trait]
impl Notifier for JsonWebhookNotifier {
    async fn send(&self, notice: &OutageNotice) -> Result<()> {
        let payload = ApprisePayload {
            version: "1.0",
            title: render::title(notice),
            message: render::body(notice),
            kind: "info",
            source: &notice.source,
            records: &notice.batch,
        };

        self.client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .context("json webhook post")?
            .error_for_status()
            .context("json webhook non-2xx")?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "json"
    }
}
