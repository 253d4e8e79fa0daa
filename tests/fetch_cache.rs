//! Fetcher cache and retry behavior against a mock server.

use std::sync::Arc;

use car_crawler::fetch::{Fetcher, ResponseCache};
use car_crawler::initialization::init_client;
use car_crawler::{Config, ErrorType, InfoType, ProcessingStats};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fetcher(cache: ResponseCache, stats: Arc<ProcessingStats>) -> Fetcher {
    let config = Config {
        timeout_seconds: 5,
        ..Default::default()
    };
    let client = init_client(&config).expect("client");
    Fetcher::new(client, Arc::new(cache), stats).with_retry_delay(10)
}

#[tokio::test]
async fn test_second_get_is_served_from_cache() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/page"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>listing</html>"))
        .expect(1)
        .mount(&server)
        .await;

    let stats = Arc::new(ProcessingStats::new());
    let fetcher = fetcher(ResponseCache::new(), Arc::clone(&stats));
    let url = format!("{}/page", server.uri());

    let first = fetcher.get(&url).await.expect("first fetch");
    let second = fetcher.get(&url).await.expect("cached fetch");
    assert_eq!(&*first, "<html>listing</html>");
    assert_eq!(first, second);
    assert_eq!(stats.get_info_count(InfoType::CacheHit), 1);
}

#[tokio::test]
async fn test_disk_cache_survives_new_fetcher() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/page"))
        .respond_with(ResponseTemplate::new(200).set_body_string("body"))
        .expect(1)
        .mount(&server)
        .await;
    let dir = TempDir::new().expect("temp dir");
    let url = format!("{}/page", server.uri());

    let stats = Arc::new(ProcessingStats::new());
    let cache = ResponseCache::with_dir(dir.path()).await.expect("cache dir");
    fetcher(cache, Arc::clone(&stats))
        .get(&url)
        .await
        .expect("network fetch");

    let cache = ResponseCache::with_dir(dir.path()).await.expect("cache dir");
    let body = fetcher(cache, Arc::clone(&stats))
        .get(&url)
        .await
        .expect("disk fetch");
    assert_eq!(&*body, "body");
}

#[tokio::test]
async fn test_failures_are_not_cached() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(404))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(200).set_body_string("back"))
        .mount(&server)
        .await;

    let stats = Arc::new(ProcessingStats::new());
    let fetcher = fetcher(ResponseCache::new(), Arc::clone(&stats));
    let url = format!("{}/flaky", server.uri());

    assert!(fetcher.get(&url).await.is_err());
    assert_eq!(stats.get_error_count(ErrorType::HttpRequestNotFound), 1);
    assert_eq!(&*fetcher.get(&url).await.expect("second fetch"), "back");
}

#[tokio::test]
async fn test_server_errors_retry_at_most_three_times() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/down"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let stats = Arc::new(ProcessingStats::new());
    let fetcher = fetcher(ResponseCache::new(), Arc::clone(&stats));

    assert!(fetcher
        .get(&format!("{}/down", server.uri()))
        .await
        .is_err());
    assert_eq!(stats.get_info_count(InfoType::RetryAttempt), 2);
}

#[tokio::test]
async fn test_memory_cache_stays_within_budget_across_fetches() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("0123456789"))
        .mount(&server)
        .await;

    let cache = Arc::new(ResponseCache::new().with_memory_budget(25));
    let config = Config {
        timeout_seconds: 5,
        ..Default::default()
    };
    let client = init_client(&config).expect("client");
    let fetcher = Fetcher::new(client, Arc::clone(&cache), Arc::new(ProcessingStats::new()));

    for i in 0..10 {
        fetcher
            .get(&format!("{}/offers/{}", server.uri(), i))
            .await
            .expect("fetch");
    }

    assert_eq!(cache.len().await, 2);
    assert!(cache.memory_bytes().await <= 25);
}
