// src/watch.rs
//! The poll loop: fetch every configured page, hand the batches to the notifier
//! mux, wait for the next cycle start, repeat.

use std::time::Duration;

use chrono::Utc;
use metrics::{counter, gauge};
use thiserror::Error;
use tokio::time::{self, Instant};

use crate::config::{ConfigError, Settings};
use crate::humanize::natural_duration;
use crate::notify::{NotifierMux, OutageNotice};
use crate::outage::{FetchError, OutageSource, PageFetcher, PageSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Forever,
    /// A single cycle; any fetch failure is returned immediately.
    Once,
}

#[derive(Debug, Clone, Copy)]
pub struct WatchPolicy {
    /// Time between cycle starts.
    pub interval: Duration,
    /// Consecutive failed cycles tolerated before giving up. 0 = keep going forever.
    pub max_consecutive_failures: u32,
}

impl WatchPolicy {
    pub fn from_settings(s: &Settings) -> Self {
        Self {
            interval: s.check_interval(),
            max_consecutive_failures: s.max_consecutive_failures,
        }
    }
}

#[derive(Error, Debug)]
pub enum WatchError {
    #[error("fetching `{source_name}` failed: {error}")]
    Fetch {
        source_name: String,
        #[source]
        error: FetchError,
    },
    #[error("giving up after {consecutive} consecutive failed cycles: {last}")]
    TooManyFailures {
        consecutive: u32,
        #[source]
        last: FetchError,
    },
    #[error("building http client: {0}")]
    Client(#[source] FetchError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// What one cycle produced.
#[derive(Debug, Default)]
pub struct CycleReport {
    pub records: usize,
    pub notify_failures: usize,
    /// (source name, error) for every page that could not be fetched.
    pub failures: Vec<(String, FetchError)>,
}

impl CycleReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

pub struct Watcher {
    sources: Vec<Box<dyn OutageSource>>,
    notifier: NotifierMux,
    policy: WatchPolicy,
}

impl Watcher {
    pub fn new(
        sources: Vec<Box<dyn OutageSource>>,
        notifier: NotifierMux,
        policy: WatchPolicy,
    ) -> Self {
        Self {
            sources,
            notifier,
            policy,
        }
    }

    /// One HTTP source per `outage_page_urls` entry, sharing a single client.
    pub fn from_settings(s: &Settings, notifier: NotifierMux) -> Result<Self, WatchError> {
        let fetcher = PageFetcher::new(&s.fetch_options()).map_err(WatchError::Client)?;
        let markers = s.table_markers()?;

        let sources = s
            .outage_page_urls
            .iter()
            .map(|(name, url)| {
                Box::new(PageSource::from_url(
                    name.clone(),
                    url.clone(),
                    fetcher.clone(),
                    markers.clone(),
                )) as Box<dyn OutageSource>
            })
            .collect();

        Ok(Self::new(sources, notifier, WatchPolicy::from_settings(s)))
    }

    pub fn policy(&self) -> WatchPolicy {
        self.policy
    }

    /// Fetch every source in order; failed sources are logged and reported, the rest still notify.
    pub async fn run_cycle(&self) -> CycleReport {
        let mut report = CycleReport::default();

        for src in &self.sources {
            match src.fetch_batch().await {
                Ok(batch) => {
                    tracing::info!(source = src.name(), records = batch.len(), "outage page parsed");
                    report.records += batch.len();
                    let notice = OutageNotice {
                        source: src.name().to_string(),
                        page_url: src.page_url().to_string(),
                        batch,
                        fetched_at: Utc::now(),
                    };
                    report.notify_failures += self.notifier.notify(&notice).await;
                }
                Err(e) => {
                    tracing::error!(
                        source = src.name(),
                        url = src.page_url(),
                        timeout = e.is_timeout(),
                        error = %e,
                        "failed to fetch outage page"
                    );
                    report.failures.push((src.name().to_string(), e));
                }
            }
        }

        tracing::info!(
            records = report.records,
            fetch_failures = report.failures.len(),
            notify_failures = report.notify_failures,
            "cycle finished"
        );
        counter!("outage_cycles_total").increment(1);
        gauge!("outage_last_cycle_ts").set(Utc::now().timestamp() as f64);
        report
    }

    /// Runs until the failure threshold trips (or after one cycle in [`RunMode::Once`]).
    ///
    /// Cycles start every `interval` measured from the previous start; a cycle that
    /// overruns the interval is followed immediately by the next one.
    pub async fn run(&self, mode: RunMode) -> Result<(), WatchError> {
        let max = self.policy.max_consecutive_failures;
        let mut consecutive: u32 = 0;

        loop {
            let started = Instant::now();
            let report = self.run_cycle().await;
            let ok = report.is_success();

            if let Some((source_name, error)) = report.failures.into_iter().last() {
                if mode == RunMode::Once {
                    return Err(WatchError::Fetch { source_name, error });
                }
                consecutive += 1;
                if max > 0 && consecutive >= max {
                    return Err(WatchError::TooManyFailures {
                        consecutive,
                        last: error,
                    });
                }
                tracing::warn!(
                    consecutive,
                    max,
                    "cycle had fetch failures; retrying at next interval"
                );
            }
            if ok {
                consecutive = 0;
            }

            if mode == RunMode::Once {
                return Ok(());
            }

            let next = started + self.policy.interval;
            let wait = next.saturating_duration_since(Instant::now());
            tracing::info!(next_check_in = %natural_duration(wait.as_secs()), "sleeping");
            time::sleep_until(next).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outage::{OutageBatch, OutageRecord};
    use reqwest::StatusCode;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    /// Scripted source: `true` = success with one record, `false` = 503.
    struct Scripted {
        script: Vec<bool>,
        calls: Arc<AtomicU32>,
    }

    #[async_trait::async_trait]
    impl OutageSource for Scripted {
        async fn fetch_batch(&self) -> Result<OutageBatch, FetchError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) as usize;
            if self.script.get(n).copied().unwrap_or(false) {
                Ok(vec![OutageRecord {
                    date: format!("day {n}"),
                    pdf_links: vec!["/a.pdf".into()],
                }])
            } else {
                Err(FetchError::Status {
                    url: "https://example.test".into(),
                    status: StatusCode::SERVICE_UNAVAILABLE,
                })
            }
        }
        fn name(&self) -> &str {
            "scripted"
        }
        fn page_url(&self) -> &str {
            "https://example.test"
        }
    }

    fn watcher(script: Vec<bool>, max: u32) -> (Watcher, Arc<AtomicU32>) {
        let calls = Arc::new(AtomicU32::new(0));
        let src = Scripted {
            script,
            calls: calls.clone(),
        };
        let w = Watcher::new(
            vec![Box::new(src)],
            NotifierMux::default().without_console(),
            WatchPolicy {
                interval: Duration::from_secs(60),
                max_consecutive_failures: max,
            },
        );
        (w, calls)
    }

    #[tokio::test(start_paused = true)]
    async fn terminates_after_threshold_of_consecutive_failures() {
        let (w, calls) = watcher(vec![false, false, true, false, false, false], 3);
        let err = w.run(RunMode::Forever).await.unwrap_err();
        assert!(matches!(
            err,
            WatchError::TooManyFailures { consecutive: 3, .. }
        ));
        // the success at call 3 reset the counter
        assert_eq!(calls.load(Ordering::SeqCst), 6);
    }

    #[tokio::test(start_paused = true)]
    async fn once_mode_returns_fetch_error() {
        let (w, calls) = watcher(vec![false], 0);
        let err = w.run(RunMode::Once).await.unwrap_err();
        assert!(matches!(err, WatchError::Fetch { .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn once_mode_success_runs_single_cycle() {
        let (w, calls) = watcher(vec![true, true], 1);
        w.run(RunMode::Once).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cycles_start_one_interval_apart() {
        let (w, calls) = watcher(vec![true, true, false], 1);
        let t0 = Instant::now();
        let _ = w.run(RunMode::Forever).await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(Instant::now() - t0, Duration::from_secs(120));
    }

    struct Refusing;

    #[async_trait::async_trait]
    impl crate::notify::Notifier for Refusing {
        async fn send(&self, _notice: &OutageNotice) -> anyhow::Result<()> {
            anyhow::bail!("channel down")
        }
        fn name(&self) -> &'static str {
            "refusing"
        }
    }

    #[tokio::test]
    async fn failing_channel_is_reported_not_fatal() {
        let calls = Arc::new(AtomicU32::new(0));
        let src = Scripted {
            script: vec![true, true],
            calls,
        };
        let w = Watcher::new(
            vec![Box::new(src)],
            NotifierMux::default()
                .without_console()
                .with_channel(Box::new(Refusing)),
            WatchPolicy {
                interval: Duration::from_secs(60),
                max_consecutive_failures: 1,
            },
        );
        let report = w.run_cycle().await;
        assert!(report.is_success());
        assert_eq!(report.notify_failures, 1);
        w.run(RunMode::Once).await.expect("notify failures do not end the run");
    }

    #[tokio::test]
    async fn cycle_report_counts_records() {
        let (w, _) = watcher(vec![true], 0);
        let report = w.run_cycle().await;
        assert!(report.is_success());
        assert_eq!(report.records, 1);
    }
}
