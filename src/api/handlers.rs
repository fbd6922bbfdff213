//! API Handlers
//!
//! HTTP request handlers for the gateway endpoints that sit behind the access pipeline.

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use tower::ServiceExt;
use tower_http::services::ServeDir;
use tracing::warn;

use crate::config::Config;
use crate::error::{GatewayError, Result};
use crate::gateway::{AccessPolicy, Pipeline};
use crate::models::LoaderStatus;

/// Application state shared across all handlers.
///
/// Everything here is read-only after startup.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Directory static files are resolved against
    pub asset_root: PathBuf,
    /// Document served for every unresolved request
    pub home_document: PathBuf,
    /// Path of the loader status endpoint
    pub loader_path: String,
    /// Access-control pipeline run before any handler
    pub pipeline: Arc<Pipeline>,
}

impl AppState {
    /// Creates a new AppState serving `asset_root` under `policy`.
    pub fn new(asset_root: impl Into<PathBuf>, policy: &AccessPolicy) -> Self {
        let asset_root = asset_root.into();
        Self {
            home_document: asset_root.join(&policy.home_document),
            asset_root,
            loader_path: policy.loader_path.clone(),
            pipeline: Arc::new(Pipeline::new(policy)),
        }
    }

    /// Creates a new AppState from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.asset_root.clone(), &config.policy)
    }
}

/// Handler for GET /frontend-loader
///
/// Lets the frontend confirm it passed the gateway.
pub async fn loader_status_handler() -> Json<LoaderStatus> {
    Json(LoaderStatus::allowed())
}

/// Fallback handler for every other request.
///
/// Serves the matching file from the asset root; anything that does not
/// resolve to a file (missing path, directory, non-GET method) gets the
/// home document instead.
pub async fn static_or_home_handler(
    State(state): State<AppState>,
    request: Request,
) -> Result<Response> {
    let response = match ServeDir::new(&state.asset_root).oneshot(request).await {
        Ok(response) => response,
        Err(infallible) => match infallible {},
    };

    match response.status() {
        StatusCode::NOT_FOUND | StatusCode::METHOD_NOT_ALLOWED => home_document(&state).await,
        _ => Ok(response.into_response()),
    }
}

/// Reads the home document for the single-page-app fallback.
async fn home_document(state: &AppState) -> Result<Response> {
    match tokio::fs::read(&state.home_document).await {
        Ok(contents) => Ok(Html(contents).into_response()),
        Err(err) => {
            warn!(
                path = %state.home_document.display(),
                error = %err,
                "Home document unavailable"
            );
            Err(GatewayError::HomeDocumentMissing(state.home_document.clone()))
        }
    }
}
