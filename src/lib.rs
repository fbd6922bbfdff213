//! Edge Gate - A static frontend gateway
//!
//! Gates a single-page app behind header-based access checks and provides an
//! offline cache agent that falls back to the last good response when the
//! network fails.

pub mod api;
pub mod config;
pub mod error;
pub mod gateway;
pub mod models;
pub mod offline;

pub use api::AppState;
pub use config::Config;
pub use gateway::{AccessPolicy, Pipeline};
pub use offline::{FetchOutcome, OfflineCacheAgent};
