//! Sends a sample outage batch through the configured channels (console always).
//! Handy for checking apprise URLs before leaving the watcher running.
//!
//! Usage: `notify_demo [CONFIG_PATH]`

use chrono::Utc;
use power_outage_watch::config::{config_path, load_config, resolve_apprise_urls};
use power_outage_watch::{NotifierMux, OutageNotice, OutageRecord};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().with_target(false).init();

    let arg = std::env::args().nth(1);
    let cfg = load_config(&config_path(arg.as_deref()))?;
    let mux = NotifierMux::from_urls(&resolve_apprise_urls(&cfg.apprise_urls));

    let (source, page_url) = cfg
        .settings
        .outage_page_urls
        .iter()
        .next()
        .map(|(k, v)| (k.clone(), v.clone()))
        .unwrap_or_default();

    let notice = OutageNotice {
        source,
        page_url,
        batch: vec![OutageRecord {
            date: Utc::now().format("%d-%m-%Y").to_string(),
            pdf_links: vec!["/notify-demo/sample.pdf".into()],
        }],
        fetched_at: Utc::now(),
    };
    let failed = mux.notify(&notice).await;

    println!(
        "notify-demo done: {} channel(s), {failed} failed",
        mux.channel_count()
    );
    Ok(())
}
