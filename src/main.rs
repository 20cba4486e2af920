//! power-outage-watch — binary entrypoint.
//! Loads the YAML config, wires sources and notification channels, then runs the poll loop.
//!
//! Usage: `power-outage-watch [--once] [CONFIG_PATH]`

use anyhow::Context;
use power_outage_watch::config::{config_path, load_config, resolve_apprise_urls};
use power_outage_watch::humanize::natural_duration;
use power_outage_watch::metrics::Metrics;
use power_outage_watch::{NotifierMux, RunMode, Watcher};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const ENV_RUN_ONCE: &str = "OUTAGE_WATCH_ONCE";

/// Compact logs by default; `LOG_FORMAT=json` switches to JSON lines.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("power_outage_watch=info,warn"));

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact())
            .init();
    }
}

struct Args {
    once: bool,
    config: Option<String>,
}

fn parse_args() -> Args {
    let mut once = std::env::var(ENV_RUN_ONCE).is_ok_and(|v| v == "1");
    let mut config = None;
    for arg in std::env::args().skip(1) {
        if arg == "--once" {
            once = true;
        } else if config.is_none() {
            config = Some(arg);
        }
    }
    Args { once, config }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev so `env:` apprise entries resolve.
    let _ = dotenvy::dotenv();
    init_tracing();

    let args = parse_args();
    let path = config_path(args.config.as_deref());
    let cfg = load_config(&path).with_context(|| format!("loading {}", path.display()))?;
    let settings = &cfg.settings;

    let _metrics = Metrics::install(settings.metrics_addr).context("installing metrics")?;

    let urls = resolve_apprise_urls(&cfg.apprise_urls);
    let notifier = NotifierMux::from_urls(&urls);
    let watcher = Watcher::from_settings(settings, notifier)?;

    let mode = if args.once {
        RunMode::Once
    } else {
        RunMode::Forever
    };
    tracing::info!(
        config = %path.display(),
        sources = settings.outage_page_urls.len(),
        channels = urls.len(),
        interval = %natural_duration(settings.check_interval),
        ?mode,
        "power outage watch starting"
    );

    tokio::select! {
        res = watcher.run(mode) => res?,
        _ = tokio::signal::ctrl_c() => tracing::info!("interrupted; shutting down"),
    }
    Ok(())
}
