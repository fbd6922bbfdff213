//! API Module
//!
//! HTTP handlers and routing for the gateway.
//!
//! # Endpoints
//! - `GET /frontend-loader` - Loader status check
//! - `*` - Static files, falling back to the home document

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
