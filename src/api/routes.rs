//! API Routes
//!
//! Configures the Axum router with the gateway endpoints and middleware.

use axum::{middleware, routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{loader_status_handler, static_or_home_handler, AppState};
use crate::gateway::{decorate_responses, enforce_access};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /frontend-loader` - Loader status (`{"allowed": true}`)
/// - everything else - Static file from the asset root, or the home document
///
/// # Middleware (outermost first)
/// - Tracing: Logs all requests
/// - Decoration: Embedding headers on every response, preflights included
/// - CORS: Allows any origin
/// - Access pipeline: geography, bots, origin control
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let access = middleware::from_fn_with_state(state.pipeline.clone(), enforce_access);
    let decorate = middleware::from_fn_with_state(state.pipeline.clone(), decorate_responses);

    Router::new()
        .route(
            &state.loader_path,
            get(loader_status_handler).fallback(static_or_home_handler),
        )
        .fallback(static_or_home_handler)
        .layer(access)
        .layer(cors)
        .layer(decorate)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::AccessPolicy;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::util::ServiceExt;

    fn create_test_app(dir: &std::path::Path) -> Router {
        std::fs::write(dir.join("index.html"), "<h1>home</h1>").unwrap();
        create_router(AppState::new(dir, &AccessPolicy::default()))
    }

    #[tokio::test]
    async fn test_loader_endpoint() {
        let dir = tempfile::tempdir().unwrap();
        let app = create_test_app(dir.path());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/frontend-loader")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_root_serves_home() {
        let dir = tempfile::tempdir().unwrap();
        let app = create_test_app(dir.path());

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["x-frame-options"], "ALLOWALL");
    }

    #[tokio::test]
    async fn test_direct_access_forbidden() {
        let dir = tempfile::tempdir().unwrap();
        let app = create_test_app(dir.path());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/private")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
