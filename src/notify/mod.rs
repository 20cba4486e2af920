// src/notify/mod.rs
pub mod console;
pub mod discord;
pub mod email;
pub mod render;
pub mod slack;
pub mod target;
pub mod webhook;

use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, Utc};
use metrics::counter;
use reqwest::Client;

use crate::outage::OutageBatch;
use console::ConsoleNotifier;
use discord::DiscordNotifier;
use email::EmailNotifier;
use slack::SlackNotifier;
use target::{parse_target, scheme_of, Target};
use webhook::JsonWebhookNotifier;

/// Per-request deadline for remote channels; a stalled endpoint must not hold up the poll loop.
pub const NOTIFY_TIMEOUT: Duration = Duration::from_secs(10);

/// One source's result for one cycle, as handed to notifiers.
#[derive(Debug, Clone)]
pub struct OutageNotice {
    pub source: String,
    pub page_url: String,
    pub batch: OutageBatch,
    pub fetched_at: DateTime<Utc>,
}

#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, notice: &OutageNotice) -> Result<()>;
    fn name(&self) -> &'static str;
}

/// Fans a notice out to the console and every configured channel.
///
/// The console sees every cycle; remote channels only hear about non-empty
/// batches. A failing channel is logged and counted, never propagated.
pub struct NotifierMux {
    console: Option<ConsoleNotifier>,
    channels: Vec<Box<dyn Notifier>>,
}

impl Default for NotifierMux {
    fn default() -> Self {
        Self {
            console: Some(ConsoleNotifier),
            channels: Vec::new(),
        }
    }
}

impl NotifierMux {
    /// Build channels from already-resolved Apprise URLs; unusable entries are skipped.
    pub fn from_urls(urls: &[String]) -> Self {
        Self::from_urls_with_timeout(urls, NOTIFY_TIMEOUT)
    }

    pub fn from_urls_with_timeout(urls: &[String], timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        let mut mux = Self::default();
        for url in urls {
            match build_channel(url, &client) {
                Ok(ch) => {
                    tracing::info!(channel = ch.name(), "notification channel enabled");
                    mux.channels.push(ch);
                }
                Err(e) => tracing::warn!(
                    scheme = scheme_of(url),
                    error = %e,
                    "skipping notification url"
                ),
            }
        }
        mux
    }

    pub fn with_channel(mut self, ch: Box<dyn Notifier>) -> Self {
        self.channels.push(ch);
        self
    }

    /// Disable stdout printing.
    pub fn without_console(mut self) -> Self {
        self.console = None;
        self
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Returns the number of channels that failed.
    pub async fn notify(&self, notice: &OutageNotice) -> usize {
        if let Some(console) = &self.console {
            if let Err(e) = console.send(notice).await {
                tracing::warn!(channel = console.name(), error = %format!("{e:#}"), "notification failed");
            }
        }
        if notice.batch.is_empty() {
            tracing::debug!(source = %notice.source, "empty batch; remote channels not notified");
            return 0;
        }

        let mut failed = 0;
        for ch in &self.channels {
            if let Err(e) = ch.send(notice).await {
                failed += 1;
                counter!("outage_notify_errors_total").increment(1);
                tracing::warn!(channel = ch.name(), error = %format!("{e:#}"), "notification failed");
            }
        }
        failed
    }
}

fn build_channel(url: &str, client: &Client) -> Result<Box<dyn Notifier>> {
    let ch: Box<dyn Notifier> = match parse_target(url)? {
        Target::Discord { webhook } => Box::new(DiscordNotifier::new(webhook, client.clone())),
        Target::Slack { webhook } => Box::new(SlackNotifier::new(webhook, client.clone())),
        Target::Json { url } => Box::new(JsonWebhookNotifier::new(url, client.clone())),
        Target::Email(t) => Box::new(EmailNotifier::from_target(&t)?),
    };
    Ok(ch)
}
