//! Response DTOs for the gateway
//!
//! Defines the structure of outgoing JSON bodies.

use serde::Serialize;

/// Response body for the loader status endpoint (GET /frontend-loader)
///
/// The frontend calls this to check it is being served; it is not a security boundary.
#[derive(Debug, Clone, Serialize)]
pub struct LoaderStatus {
    /// Always true once the request got past the access pipeline
    pub allowed: bool,
}

impl LoaderStatus {
    /// Creates the allowed status
    pub fn allowed() -> Self {
        Self { allowed: true }
    }
}
