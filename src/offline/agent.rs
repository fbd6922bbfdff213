//! Offline Cache Agent
//!
//! Network-first fetch handling with the last good response as fallback.
//!
//! Every intercepted fetch gets exactly one network attempt. A successful
//! response is returned immediately while a copy is written to the store in
//! the background; a failed attempt is answered from the store if it holds a
//! copy. There is no retry, backoff or eviction.

use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::fetch::{FetchRequest, FetchResponse, Fetcher};
use super::lifecycle::{Lifecycle, LifecycleState};
use super::store::{CacheStorage, SharedStore};
use crate::error::AgentError;

/// Name of the store the agent writes to.
pub const CACHE_NAME: &str = "render-fast-v1";

// == Fetch Outcome ==
/// What the agent answered an intercepted fetch with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Live response from the network
    Network(FetchResponse),
    /// Network failed; stored copy from an earlier success
    Cached(FetchResponse),
    /// Network failed and nothing was stored for this request
    Unavailable,
}

impl FetchOutcome {
    // == Into Response ==
    /// The response handed back to the page, if any.
    pub fn into_response(self) -> Option<FetchResponse> {
        match self {
            FetchOutcome::Network(response) | FetchOutcome::Cached(response) => Some(response),
            FetchOutcome::Unavailable => None,
        }
    }

    // == Is Cached ==
    /// True when the answer came from the store.
    pub fn is_cached(&self) -> bool {
        matches!(self, FetchOutcome::Cached(_))
    }
}

// == Offline Cache Agent ==
/// Intercepts fetches once active and keeps the last good response per request.
pub struct OfflineCacheAgent<F> {
    fetcher: F,
    storage: Arc<CacheStorage>,
    cache_name: String,
    lifecycle: Lifecycle,
    pending_writes: Mutex<Vec<JoinHandle<()>>>,
}

impl<F: Fetcher> OfflineCacheAgent<F> {
    // == Constructor ==
    /// Creates an agent writing to [`CACHE_NAME`] in a fresh storage.
    pub fn new(fetcher: F) -> Self {
        Self::with_storage(fetcher, Arc::new(CacheStorage::new()), CACHE_NAME)
    }

    // == With Storage ==
    /// Creates an agent on an existing storage, e.g. one shared with the page.
    pub fn with_storage(
        fetcher: F,
        storage: Arc<CacheStorage>,
        cache_name: impl Into<String>,
    ) -> Self {
        Self {
            fetcher,
            storage,
            cache_name: cache_name.into(),
            lifecycle: Lifecycle::new(),
            pending_writes: Mutex::new(Vec::new()),
        }
    }

    // == Accessors ==
    /// Current lifecycle state.
    pub fn state(&self) -> LifecycleState {
        self.lifecycle.state()
    }

    /// True once activation claimed the open clients.
    pub fn controls_clients(&self) -> bool {
        self.lifecycle.controls_clients()
    }

    /// Storage holding the agent's named store.
    pub fn storage(&self) -> &Arc<CacheStorage> {
        &self.storage
    }

    /// Name of the store responses are written to.
    pub fn cache_name(&self) -> &str {
        &self.cache_name
    }

    // == Install ==
    /// Install event: take effect without waiting for existing clients.
    pub fn install(&mut self) -> Result<(), AgentError> {
        self.lifecycle.install()
    }

    // == Activate ==
    /// Activate event: take control of every open client now.
    pub fn activate(&mut self) -> Result<(), AgentError> {
        self.lifecycle.activate()
    }

    // == Handle Fetch ==
    /// Answers an intercepted fetch.
    ///
    /// Before activation the agent controls no client, so the request goes
    /// straight to the network and the store is left alone.
    pub async fn handle_fetch(&self, request: FetchRequest) -> FetchOutcome {
        if !self.lifecycle.is_active() {
            return match self.fetcher.fetch(&request).await {
                Ok(response) => FetchOutcome::Network(response),
                Err(err) => {
                    warn!(url = %request.url, error = %err, "Uncontrolled fetch failed");
                    FetchOutcome::Unavailable
                }
            };
        }

        let store = self.storage.open(&self.cache_name).await;

        match self.fetcher.fetch(&request).await {
            Ok(response) => {
                self.store_in_background(store, request, response.clone())
                    .await;
                FetchOutcome::Network(response)
            }
            Err(err) => {
                debug!(url = %request.url, error = %err, "Network failed, trying cache");
                match store.read().await.lookup(&request) {
                    Some(cached) => FetchOutcome::Cached(cached),
                    None => {
                        warn!(url = %request.url, "Network failed and nothing cached");
                        FetchOutcome::Unavailable
                    }
                }
            }
        }
    }

    // == Store In Background ==
    /// Spawns a detached store write without awaiting it.
    ///
    /// The write outlives the agent. Concurrent writes to the same request
    /// race; the last one to run wins. The handle list lock is never held
    /// across an await.
    async fn store_in_background(
        &self,
        store: SharedStore,
        request: FetchRequest,
        response: FetchResponse,
    ) {
        let handle = tokio::spawn(async move {
            if let Err(err) = store.write().await.put(&request, response) {
                debug!(url = %request.url, error = %err, "Response not cached");
            }
        });

        let mut pending = self.pending_writes.lock().await;
        pending.retain(|handle| !handle.is_finished());
        pending.push(handle);
    }

    // == Settle ==
    /// Waits for every background write spawned so far.
    ///
    /// Never called on the fetch path; fetches keep running while it waits.
    pub async fn settle(&self) {
        let handles = std::mem::take(&mut *self.pending_writes.lock().await);
        for handle in handles {
            if let Err(err) = handle.await {
                warn!(error = %err, "Background cache write failed");
            }
        }
    }
}

impl<F> std::fmt::Debug for OfflineCacheAgent<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OfflineCacheAgent")
            .field("cache_name", &self.cache_name)
            .field("lifecycle", &self.lifecycle)
            .finish_non_exhaustive()
    }
}
