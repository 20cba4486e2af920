use anyhow::{Context, Result};
use reqwest::Client;

use super::{render, Notifier, OutageNotice};

pub struct SlackNotifier {
    webhook_url: String,
    client: Client,
}

impl SlackNotifier {
    pub fn new(webhook_url: String, client: Client) -> Self {
        Self {
            webhook_url,
            client,
        }
    }
}

#[async_trait::async_trait]
impl Notifier for SlackNotifier {
    async fn send(&self, notice: &OutageNotice) -> Result<()> {
        let text = format!(
            "*{}*\n{}\n<{}|source page>",
            render::title(notice),
            render::body(notice),
            notice.page_url
        );
        let body = serde_json::json!({ "text": text });

        self.client
            .post(&self.webhook_url)
            .json(&body)
            .send()
            .await
            .context("slack post")?
            .error_for_status()
            .context("slack non-2xx")?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "slack"
    }
}
