//! Request DTOs for the gateway
//!
//! Defines the query parameters the access pipeline inspects.

use serde::Deserialize;

/// Query string of an inbound request.
///
/// Only `loader` is read; other parameters are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoaderQuery {
    /// `loader=true` marks a direct attempt to pull the loader
    #[serde(default)]
    pub loader: Option<String>,
}
