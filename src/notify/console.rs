// src/notify/console.rs
use anyhow::Result;

use super::{render, Notifier, OutageNotice};

/// Prints every cycle's batch to stdout. Always part of the mux.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleNotifier;

#[async_trait::async_trait]
impl Notifier for ConsoleNotifier {
    async fn send(&self, notice: &OutageNotice) -> Result<()> {
        println!(
            "[{}] {} ({} record(s))\n{}",
            notice.fetched_at.to_rfc3339(),
            render::title(notice),
            notice.batch.len(),
            render::body(notice)
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "console"
    }
}
