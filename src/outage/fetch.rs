// src/outage/fetch.rs
use std::time::Duration;

use metrics::counter;
use reqwest::{redirect, Client, StatusCode};
use thiserror::Error;

pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
const MAX_REDIRECTS: usize = 10;

/// Failure to obtain the page body. Always fatal for the current cycle.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("building http client failed: {0}")]
    Client(#[source] reqwest::Error),
    #[error("GET {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("GET {url} returned {status}")]
    Status { url: String, status: StatusCode },
    #[error("reading body of {url} failed: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl FetchError {
    pub fn is_timeout(&self) -> bool {
        match self {
            FetchError::Request { source, .. } | FetchError::Body { source, .. } => {
                source.is_timeout()
            }
            _ => false,
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            FetchError::Status { status, .. } => Some(*status),
            FetchError::Request { source, .. } => source.status(),
            _ => None,
        }
    }
}

/// HTTP settings for page fetches.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub timeout: Duration,
    /// The utility site has served broken certificate chains in the past.
    pub accept_invalid_certs: bool,
    pub user_agent: String,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            accept_invalid_certs: true,
            user_agent: default_user_agent(),
        }
    }
}

pub fn default_user_agent() -> String {
    format!("power-outage-watch/{}", env!("CARGO_PKG_VERSION"))
}

/// Shared HTTP client for all configured pages.
#[derive(Clone)]
pub struct PageFetcher {
    client: Client,
}

impl PageFetcher {
    pub fn new(opts: &FetchOptions) -> Result<Self, FetchError> {
        let mut builder = Client::builder()
            .user_agent(opts.user_agent.clone())
            .timeout(opts.timeout)
            .redirect(redirect::Policy::limited(MAX_REDIRECTS));

        if opts.accept_invalid_certs {
            builder = builder.danger_accept_invalid_certs(true);
        }

        let client = builder.build().map_err(FetchError::Client)?;
        Ok(Self { client })
    }

    /// GET `url` and return the body. Any non-2xx final status is an error.
    pub async fn fetch_html(&self, url: &str) -> Result<String, FetchError> {
        counter!("outage_fetch_total").increment(1);

        let rsp = match self.client.get(url).send().await {
            Ok(rsp) => rsp,
            Err(source) => {
                counter!("outage_fetch_errors_total").increment(1);
                return Err(FetchError::Request {
                    url: url.to_string(),
                    source,
                });
            }
        };

        let status = rsp.status();
        if !status.is_success() {
            counter!("outage_fetch_errors_total").increment(1);
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        rsp.text().await.map_err(|source| {
            counter!("outage_fetch_errors_total").increment(1);
            FetchError::Body {
                url: url.to_string(),
                source,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_reports_code() {
        let e = FetchError::Status {
            url: "https://example.test/page".into(),
            status: StatusCode::BAD_GATEWAY,
        };
        assert_eq!(e.status(), Some(StatusCode::BAD_GATEWAY));
        assert!(!e.is_timeout());
        assert_eq!(
            e.to_string(),
            "GET https://example.test/page returned 502 Bad Gateway"
        );
    }

    #[test]
    fn default_options_match_legacy_site_needs() {
        let o = FetchOptions::default();
        assert_eq!(o.timeout, Duration::from_secs(60));
        assert!(o.accept_invalid_certs);
        assert!(o.user_agent.starts_with("power-outage-watch/"));
    }
}
