//! Cache Store Module
//!
//! Named stores of previously fetched responses, keyed by request identity.
//! Stores grow without bound; nothing is evicted or expired.

use std::collections::HashMap;
use std::sync::Arc;

use axum::http::{Method, StatusCode};
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::fetch::{FetchRequest, FetchResponse};
use crate::error::StoreError;

/// A store shared between the agent and its background writers.
pub type SharedStore = Arc<RwLock<CacheStore>>;

// == Request Key ==
/// Identity of a cached request: method plus full URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestKey {
    pub method: Method,
    pub url: String,
}

impl From<&FetchRequest> for RequestKey {
    fn from(request: &FetchRequest) -> Self {
        Self {
            method: request.method.clone(),
            url: request.url.clone(),
        }
    }
}

// == Cached Response ==
/// A stored copy and when it was taken.
#[derive(Debug, Clone)]
pub struct CachedResponse {
    pub response: FetchResponse,
    pub stored_at: DateTime<Utc>,
}

// == Cache Store ==
/// One named store.
#[derive(Debug, Default)]
pub struct CacheStore {
    entries: HashMap<RequestKey, CachedResponse>,
}

impl CacheStore {
    // == Constructor ==
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    // == Put ==
    /// Stores a copy of `response` for `request`, replacing any previous copy.
    ///
    /// Only GET requests are cacheable, and partial (206) responses are refused.
    pub fn put(&mut self, request: &FetchRequest, response: FetchResponse) -> Result<(), StoreError> {
        if request.method != Method::GET {
            return Err(StoreError::UnsupportedMethod(request.method.to_string()));
        }
        if response.status == StatusCode::PARTIAL_CONTENT {
            return Err(StoreError::PartialContent);
        }

        self.entries.insert(
            RequestKey::from(request),
            CachedResponse {
                response,
                stored_at: Utc::now(),
            },
        );
        Ok(())
    }

    // == Lookup ==
    /// Returns the stored copy for `request`, if any.
    pub fn lookup(&self, request: &FetchRequest) -> Option<FetchResponse> {
        self.entry(request).map(|cached| cached.response.clone())
    }

    // == Entry ==
    /// Returns the stored entry with its timestamp.
    pub fn entry(&self, request: &FetchRequest) -> Option<&CachedResponse> {
        self.entries.get(&RequestKey::from(request))
    }

    // == Keys ==
    /// Returns the identity of every stored request.
    pub fn keys(&self) -> Vec<RequestKey> {
        self.entries.keys().cloned().collect()
    }

    // == Length ==
    /// Returns the number of stored responses.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    /// Returns true if nothing has been stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// == Cache Storage ==
/// Registry of named stores. A store is created the first time it is opened
/// and lives as long as the storage.
#[derive(Debug, Default)]
pub struct CacheStorage {
    stores: RwLock<HashMap<String, SharedStore>>,
}

impl CacheStorage {
    // == Constructor ==
    /// Creates a storage with no stores.
    pub fn new() -> Self {
        Self::default()
    }

    // == Open ==
    /// Opens the store called `name`, creating it if needed.
    pub async fn open(&self, name: &str) -> SharedStore {
        if let Some(store) = self.stores.read().await.get(name) {
            return store.clone();
        }

        self.stores
            .write()
            .await
            .entry(name.to_string())
            .or_default()
            .clone()
    }

    // == Has ==
    /// True if a store called `name` has been opened.
    pub async fn has(&self, name: &str) -> bool {
        self.stores.read().await.contains_key(name)
    }

    // == Keys ==
    /// Names of every opened store.
    pub async fn keys(&self) -> Vec<String> {
        let mut names: Vec<String> = self.stores.read().await.keys().cloned().collect();
        names.sort();
        names
    }
}
