//! Stage Module
//!
//! The unit of the access pipeline: a predicate over request metadata that
//! either lets the request continue or rejects it.

use axum::{
    extract::Query,
    http::{header, HeaderMap, HeaderValue, Uri},
};

use crate::error::Rejection;
use crate::models::LoaderQuery;

// == Verdict ==
/// Outcome of a single stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Hand the request to the next stage
    Continue,
    /// Terminate with a 403 carrying this reason
    Reject(Rejection),
}

// == Request Meta ==
/// The request signals the access stages read. Nothing here is validated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestMeta {
    /// Raw request path, not percent-decoded
    pub path: String,
    /// Value of the `loader` query parameter
    pub loader: Option<String>,
    /// Country code reported by the edge network
    pub country: Option<String>,
    /// Declared client agent
    pub user_agent: Option<String>,
    /// Declared referring page
    pub referer: Option<String>,
}

impl RequestMeta {
    /// Extracts the signals from a request's URI and headers.
    ///
    /// Header bytes are decoded as Latin-1, so a value with non-ASCII bytes
    /// is still present and still inspected.
    pub fn from_request_parts(uri: &Uri, headers: &HeaderMap, country_header: &str) -> Self {
        let text = |name: &str| headers.get(name).map(latin1);

        Self {
            path: uri.path().to_string(),
            loader: Query::<LoaderQuery>::try_from_uri(uri)
                .ok()
                .and_then(|Query(query)| query.loader),
            country: text(country_header),
            user_agent: text(header::USER_AGENT.as_str()),
            referer: text(header::REFERER.as_str()),
        }
    }

    /// True when the caller asked for the loader directly (`?loader=true`).
    pub fn wants_loader(&self) -> bool {
        self.loader.as_deref() == Some("true")
    }
}

// == Latin-1 ==
/// Decodes a header value byte-for-byte into chars.
fn latin1(value: &HeaderValue) -> String {
    value.as_bytes().iter().map(|&byte| byte as char).collect()
}

// == Stage Trait ==
/// One step of the ordered access pipeline.
pub trait Stage: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Decides whether the request may continue.
    fn check(&self, request: &RequestMeta) -> Verdict;

    /// Annotates the outgoing response. Runs for every response, rejections included.
    fn decorate(&self, _headers: &mut HeaderMap) {}
}
