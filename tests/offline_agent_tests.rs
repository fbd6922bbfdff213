//! Integration Tests for the Offline Cache Agent
//!
//! Network-first behavior with cache fallback, against a scripted network and
//! against a live gateway reached over HTTP.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::http::{Method, StatusCode};
use edge_gate::error::FetchError;
use edge_gate::offline::{
    CacheStorage, FetchOutcome, FetchRequest, FetchResponse, Fetcher, HttpFetcher,
    OfflineCacheAgent, CACHE_NAME,
};
use edge_gate::{api::create_router, AccessPolicy, AppState};
use futures::future::join_all;
use tokio_test::assert_ok;

// == Scripted Network ==

/// Serves whatever body is currently scripted for a URL, or fails when offline.
#[derive(Default)]
struct ScriptedNetwork {
    offline: AtomicBool,
    bodies: Mutex<HashMap<String, String>>,
}

impl ScriptedNetwork {
    fn serve(&self, url: &str, body: impl Into<String>) {
        self.bodies.lock().unwrap().insert(url.to_string(), body.into());
    }

    fn go_offline(&self) {
        self.offline.store(true, Ordering::SeqCst);
    }
}

impl Fetcher for ScriptedNetwork {
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse, FetchError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(FetchError::Unreachable("dns lookup failed".into()));
        }
        let body = self.bodies.lock().unwrap().get(&request.url).cloned();
        Ok(match body {
            Some(body) => FetchResponse::new(StatusCode::OK, body),
            None => FetchResponse::new(StatusCode::NOT_FOUND, "missing"),
        })
    }
}

fn active_agent(network: &Arc<ScriptedNetwork>) -> OfflineCacheAgent<Arc<ScriptedNetwork>> {
    let mut agent = OfflineCacheAgent::new(network.clone());
    assert_ok!(agent.install());
    assert_ok!(agent.activate());
    agent
}

// == Round Trip ==

#[tokio::test]
async fn test_success_is_stored_byte_identical() {
    let network = Arc::new(ScriptedNetwork::default());
    network.serve("https://welnessclass.shop/js/app.js", "let a = 1;");
    let agent = active_agent(&network);
    let request = FetchRequest::get("https://welnessclass.shop/js/app.js");

    let live = agent.handle_fetch(request.clone()).await.into_response().unwrap();
    agent.settle().await;

    let store = agent.storage().open(CACHE_NAME).await;
    let stored = store.read().await.lookup(&request).unwrap();
    assert_eq!(stored, live);

    network.go_offline();
    let outcome = agent.handle_fetch(request).await;
    assert_eq!(outcome, FetchOutcome::Cached(live));
}

#[tokio::test]
async fn test_failure_without_copy_is_unavailable() {
    let network = Arc::new(ScriptedNetwork::default());
    let agent = active_agent(&network);
    network.go_offline();

    let outcome = agent
        .handle_fetch(FetchRequest::get("https://welnessclass.shop/never"))
        .await;
    assert_eq!(outcome, FetchOutcome::Unavailable);
}

#[tokio::test]
async fn test_network_preferred_over_cache() {
    let network = Arc::new(ScriptedNetwork::default());
    let url = "https://welnessclass.shop/data.json";
    let agent = active_agent(&network);

    network.serve(url, "v1");
    agent.handle_fetch(FetchRequest::get(url)).await;
    agent.settle().await;

    network.serve(url, "v2");
    let outcome = agent.handle_fetch(FetchRequest::get(url)).await;
    assert_eq!(outcome.into_response().unwrap().body.as_ref(), b"v2");
    agent.settle().await;

    network.go_offline();
    let outcome = agent.handle_fetch(FetchRequest::get(url)).await;
    assert_eq!(outcome.into_response().unwrap().body.as_ref(), b"v2");
}

#[tokio::test]
async fn test_error_status_is_a_network_success() {
    let network = Arc::new(ScriptedNetwork::default());
    let agent = active_agent(&network);
    let request = FetchRequest::get("https://welnessclass.shop/gone");

    let outcome = agent.handle_fetch(request.clone()).await;
    assert!(matches!(&outcome, FetchOutcome::Network(r) if r.status == StatusCode::NOT_FOUND));
    agent.settle().await;

    network.go_offline();
    let outcome = agent.handle_fetch(request).await;
    assert!(matches!(&outcome, FetchOutcome::Cached(r) if r.status == StatusCode::NOT_FOUND));
}

#[tokio::test]
async fn test_post_is_never_served_from_cache() {
    let network = Arc::new(ScriptedNetwork::default());
    network.serve("https://welnessclass.shop/form", "ok");
    let agent = active_agent(&network);
    let request = FetchRequest::new(Method::POST, "https://welnessclass.shop/form");

    let outcome = agent.handle_fetch(request.clone()).await;
    assert!(matches!(outcome, FetchOutcome::Network(_)));
    agent.settle().await;

    network.go_offline();
    assert_eq!(agent.handle_fetch(request).await, FetchOutcome::Unavailable);
}

#[tokio::test]
async fn test_concurrent_fetches_share_one_store() {
    let network = Arc::new(ScriptedNetwork::default());
    for i in 0..8 {
        network.serve(&format!("https://welnessclass.shop/{i}"), format!("asset {i}"));
    }
    let agent = active_agent(&network);

    let fetches = (0..8).map(|i| {
        agent.handle_fetch(FetchRequest::get(format!("https://welnessclass.shop/{i}")))
    });
    let outcomes = join_all(fetches).await;
    assert!(outcomes.iter().all(|o| matches!(o, FetchOutcome::Network(_))));
    agent.settle().await;

    let store = agent.storage().open(CACHE_NAME).await;
    assert_eq!(store.read().await.len(), 8);
    assert_eq!(agent.storage().keys().await, vec![CACHE_NAME.to_string()]);
}

#[tokio::test]
async fn test_shared_storage_survives_agent_replacement() {
    let network = Arc::new(ScriptedNetwork::default());
    network.serve("https://welnessclass.shop/", "home");
    let storage = Arc::new(CacheStorage::new());

    let mut first = OfflineCacheAgent::with_storage(network.clone(), storage.clone(), CACHE_NAME);
    assert_ok!(first.install());
    assert_ok!(first.activate());
    first.handle_fetch(FetchRequest::get("https://welnessclass.shop/")).await;
    first.settle().await;

    let mut second = OfflineCacheAgent::with_storage(network.clone(), storage, CACHE_NAME);
    assert_ok!(second.install());
    assert_ok!(second.activate());
    network.go_offline();

    let outcome = second.handle_fetch(FetchRequest::get("https://welnessclass.shop/")).await;
    assert!(outcome.is_cached());
}

#[tokio::test]
async fn test_background_write_outlives_dropped_agent() {
    let network = Arc::new(ScriptedNetwork::default());
    network.serve("https://welnessclass.shop/js/app.js", "let a = 1;");
    let storage = Arc::new(CacheStorage::new());

    let mut agent = OfflineCacheAgent::with_storage(network.clone(), storage.clone(), CACHE_NAME);
    assert_ok!(agent.install());
    assert_ok!(agent.activate());
    let outcome = agent
        .handle_fetch(FetchRequest::get("https://welnessclass.shop/js/app.js"))
        .await;
    assert!(matches!(outcome, FetchOutcome::Network(_)));
    drop(agent);

    let store = storage.open(CACHE_NAME).await;
    for _ in 0..100 {
        if !store.read().await.is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(store.read().await.len(), 1);
}

#[tokio::test]
async fn test_fetch_not_blocked_while_settling() {
    let network = Arc::new(ScriptedNetwork::default());
    network.serve("https://welnessclass.shop/a", "a");
    network.serve("https://welnessclass.shop/b", "b");
    let agent = active_agent(&network);

    // Hold the store so background writes cannot finish.
    let store = agent.storage().open(CACHE_NAME).await;
    let guard = store.write().await;

    agent.handle_fetch(FetchRequest::get("https://welnessclass.shop/a")).await;
    let settle = agent.settle();
    tokio::pin!(settle);
    assert!(tokio::time::timeout(Duration::from_millis(20), &mut settle)
        .await
        .is_err());

    let outcome = tokio::time::timeout(
        Duration::from_secs(1),
        agent.handle_fetch(FetchRequest::get("https://welnessclass.shop/b")),
    )
    .await
    .expect("fetch waited on pending writes");
    assert_eq!(
        outcome,
        FetchOutcome::Network(FetchResponse::new(StatusCode::OK, "b"))
    );

    drop(guard);
    settle.await;
    agent.settle().await;
    assert_eq!(store.read().await.len(), 2);
}

// == Live Gateway ==

#[tokio::test]
async fn test_agent_against_live_gateway() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), "home").unwrap();
    std::fs::create_dir_all(dir.path().join("css")).unwrap();
    std::fs::write(dir.path().join("css/site.css"), "body{color:red}").unwrap();

    let app = create_router(AppState::new(dir.path(), &AccessPolicy::default()));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let client = reqwest::Client::builder()
        .no_proxy()
        .pool_max_idle_per_host(0)
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap();
    let mut agent = OfflineCacheAgent::new(HttpFetcher::with_client(client));
    assert_ok!(agent.install());
    assert_ok!(agent.activate());

    let css = FetchRequest::get(format!("http://{addr}/css/site.css"));
    let live = match agent.handle_fetch(css.clone()).await {
        FetchOutcome::Network(response) => response,
        other => panic!("expected network response, got {other:?}"),
    };
    assert_eq!(live.status, StatusCode::OK);
    assert_eq!(live.headers["x-frame-options"], "ALLOWALL");
    assert_eq!(live.body.as_ref(), b"body{color:red}");
    agent.settle().await;

    server.abort();
    let _ = server.await;

    let outcome = agent.handle_fetch(css).await;
    assert_eq!(outcome, FetchOutcome::Cached(live));

    let never = FetchRequest::get(format!("http://{addr}/css/other.css"));
    assert_eq!(agent.handle_fetch(never).await, FetchOutcome::Unavailable);
}
