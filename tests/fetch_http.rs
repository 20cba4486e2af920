// tests/fetch_http.rs
use std::time::Duration;

use power_outage_watch::outage::{extract, FetchError, FetchOptions, PageFetcher};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PAGE: &str = include_str!("fixtures/archive_page.html");

fn fetcher(timeout: Duration) -> PageFetcher {
    PageFetcher::new(&FetchOptions {
        timeout,
        ..FetchOptions::default()
    })
    .expect("client")
}

#[tokio::test]
async fn fetches_and_extracts_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/outages"))
        .respond_with(ResponseTemplate::new(200).set_body_string(PAGE))
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/outages", server.uri());
    let batch = extract(&fetcher(Duration::from_secs(5)), &url)
        .await
        .expect("fetch ok");
    assert_eq!(batch.len(), 3);
    assert_eq!(batch[0].date, "01-06-2025");
}

#[tokio::test]
async fn follows_redirects() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "/outages"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/outages"))
        .respond_with(ResponseTemplate::new(200).set_body_string(PAGE))
        .mount(&server)
        .await;

    let url = format!("{}/old", server.uri());
    let batch = extract(&fetcher(Duration::from_secs(5)), &url)
        .await
        .expect("redirect followed");
    assert_eq!(batch.len(), 3);
}

#[tokio::test]
async fn server_error_is_fetch_error_not_empty_batch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string(PAGE))
        .mount(&server)
        .await;

    let url = format!("{}/outages", server.uri());
    let err = extract(&fetcher(Duration::from_secs(5)), &url)
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Status { .. }));
    assert_eq!(err.status().map(|s| s.as_u16()), Some(503));
}

#[tokio::test]
async fn client_error_is_fetch_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let url = format!("{}/missing", server.uri());
    let err = extract(&fetcher(Duration::from_secs(5)), &url)
        .await
        .unwrap_err();
    assert_eq!(err.status().map(|s| s.as_u16()), Some(404));
}

#[tokio::test]
async fn slow_page_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(PAGE)
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let url = format!("{}/outages", server.uri());
    let err = extract(&fetcher(Duration::from_millis(200)), &url)
        .await
        .unwrap_err();
    assert!(err.is_timeout(), "expected timeout, got {err}");
}

#[tokio::test]
async fn restyled_page_is_empty_batch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("<html><body><p>redesigned</p></body></html>"),
        )
        .mount(&server)
        .await;

    let url = format!("{}/outages", server.uri());
    let batch = extract(&fetcher(Duration::from_secs(5)), &url)
        .await
        .expect("2xx is not an error");
    assert!(batch.is_empty());
}

#[tokio::test]
async fn unreachable_host_is_request_error() {
    // Port 9 (discard) on localhost is closed in test environments.
    let err = extract(&fetcher(Duration::from_secs(2)), "http://127.0.0.1:9/outages")
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Request { .. }));
}
