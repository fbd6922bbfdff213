//! Offline Module
//!
//! Client-side cache agent: network first, falling back to the last response
//! stored for the same request.

mod agent;
mod fetch;
mod lifecycle;
mod store;

pub use agent::{FetchOutcome, OfflineCacheAgent, CACHE_NAME};
pub use fetch::{FetchRequest, FetchResponse, Fetcher, HttpFetcher};
pub use lifecycle::{Lifecycle, LifecycleState};
pub use store::{CacheStorage, CacheStore, CachedResponse, RequestKey, SharedStore};
