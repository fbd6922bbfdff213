//! Request and Response models for the gateway API
//!
//! This module defines the DTOs (Data Transfer Objects) read from requests and
//! serialized into response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::LoaderQuery;
pub use responses::LoaderStatus;
