use std::net::SocketAddr;

use metrics::{describe_counter, describe_gauge, describe_histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

/// One-time metrics registration (so series show up on the scrape endpoint).
pub fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("outage_fetch_total", "Outage page fetches attempted.");
        describe_counter!(
            "outage_fetch_errors_total",
            "Outage page fetches that failed (transport, timeout, non-2xx)."
        );
        describe_counter!("outage_records_total", "Outage records extracted.");
        describe_counter!(
            "outage_rows_skipped_total",
            "Table rows dropped for shape or missing PDF links."
        );
        describe_counter!(
            "outage_notify_errors_total",
            "Notification channel failures."
        );
        describe_counter!("outage_cycles_total", "Completed poll cycles.");
        describe_histogram!("outage_parse_ms", "Outage table parse time in milliseconds.");
        describe_gauge!("outage_last_cycle_ts", "Unix ts when the last poll cycle finished.");
    });
}

pub struct Metrics {
    pub handle: Option<PrometheusHandle>,
}

impl Metrics {
    /// Install the Prometheus recorder. With `listen` set, an HTTP listener serves the
    /// exposition format on that address; otherwise metrics are only kept in-process.
    pub fn install(listen: Option<SocketAddr>) -> anyhow::Result<Self> {
        let handle = match listen {
            Some(addr) => {
                PrometheusBuilder::new().with_http_listener(addr).install()?;
                tracing::info!(%addr, "prometheus listener started");
                None
            }
            None => Some(PrometheusBuilder::new().install_recorder()?),
        };
        ensure_metrics_described();
        Ok(Self { handle })
    }

    pub fn render(&self) -> Option<String> {
        self.handle.as_ref().map(|h| h.render())
    }
}
