//! Error types for the gateway and the offline cache agent
//!
//! Provides unified error handling using thiserror.

use std::path::PathBuf;

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::offline::LifecycleState;

// == Rejection ==
/// Reason an access-control stage refused a request.
///
/// Every variant maps to `403 Forbidden`; the message is the only difference.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Country header present but not on the allow-list
    #[error("Access blocked by country")]
    Country,

    /// User agent matched the automated-client blocklist
    #[error("Bots not allowed")]
    Bot,

    /// Protected path hit without a referer, with `loader=true`
    #[error("Direct loader access blocked")]
    DirectLoader,

    /// Protected path hit without a matching referer
    #[error("Direct access not allowed")]
    DirectAccess,
}

// == Gateway Error Enum ==
/// Errors surfaced to HTTP callers of the gateway.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Request refused by the access pipeline
    #[error(transparent)]
    AccessDenied(#[from] Rejection),

    /// The single-page-app home document could not be read
    #[error("Home document not found: {}", .0.display())]
    HomeDocumentMissing(PathBuf),
}

// == IntoResponse Implementation ==
impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = match &self {
            GatewayError::AccessDenied(_) => StatusCode::FORBIDDEN,
            GatewayError::HomeDocumentMissing(_) => StatusCode::NOT_FOUND,
        };

        (
            status,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            self.to_string(),
        )
            .into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for gateway handlers.
pub type Result<T> = std::result::Result<T, GatewayError>;

// == Fetch Error ==
/// A network attempt made on behalf of the offline cache agent failed.
///
/// Only transport failures land here; an HTTP error status is a response.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The HTTP client failed to complete the exchange
    #[error("Network request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// The network could not be reached at all
    #[error("Network unreachable: {0}")]
    Unreachable(String),
}

// == Store Error ==
/// A response could not be written to a cache store.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum StoreError {
    /// Only GET requests are cacheable
    #[error("Request method {0} is not cacheable")]
    UnsupportedMethod(String),

    /// Partial responses are never stored
    #[error("Partial content responses are not cacheable")]
    PartialContent,
}

// == Agent Error ==
/// Lifecycle misuse of the offline cache agent.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum AgentError {
    /// A lifecycle event arrived in a state that cannot accept it
    #[error("Cannot {event} while {from:?}")]
    InvalidTransition {
        from: LifecycleState,
        event: &'static str,
    },
}
