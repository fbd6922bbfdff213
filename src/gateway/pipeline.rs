//! Access Pipeline
//!
//! Runs the ordered stages over a request and adapts the result to an axum
//! middleware.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

use super::policy::AccessPolicy;
use super::stage::{RequestMeta, Stage, Verdict};
use super::stages::{AutomatedClientStage, EmbeddingPolicyStage, GeographyStage, OriginControlStage};
use crate::error::GatewayError;

// == Pipeline ==
/// An ordered list of stages; the first rejection wins.
pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
    country_header: String,
}

impl Pipeline {
    /// Builds the standard gateway pipeline from a policy.
    ///
    /// Order: embedding, geography, automated client, origin control.
    pub fn new(policy: &AccessPolicy) -> Self {
        let policy = policy.clone().normalized();
        let stages: Vec<Box<dyn Stage>> = vec![
            Box::new(EmbeddingPolicyStage),
            Box::new(GeographyStage::new(policy.allowed_countries.clone())),
            Box::new(AutomatedClientStage::new(policy.blocked_agents.clone())),
            Box::new(OriginControlStage::new(&policy)),
        ];
        Self::from_stages(stages, policy.country_header)
    }

    /// Builds a pipeline from an explicit stage list.
    pub fn from_stages(stages: Vec<Box<dyn Stage>>, country_header: impl Into<String>) -> Self {
        Self {
            stages,
            country_header: country_header.into(),
        }
    }

    /// Header the request's country code is read from.
    pub fn country_header(&self) -> &str {
        &self.country_header
    }

    /// Names of the stages in evaluation order.
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }

    // == Evaluate ==
    /// Runs the stages in order, stopping at the first rejection.
    pub fn evaluate(&self, request: &RequestMeta) -> Verdict {
        for stage in &self.stages {
            if let Verdict::Reject(rejection) = stage.check(request) {
                debug!(
                    stage = stage.name(),
                    path = %request.path,
                    reason = %rejection,
                    "Request rejected"
                );
                return Verdict::Reject(rejection);
            }
        }
        Verdict::Continue
    }

    // == Decorate ==
    /// Lets every stage annotate the outgoing response headers.
    pub fn decorate(&self, headers: &mut HeaderMap) {
        for stage in &self.stages {
            stage.decorate(headers);
        }
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("stages", &self.stage_names())
            .field("country_header", &self.country_header)
            .finish()
    }
}

// == Access Middleware ==
/// axum middleware that gates every request through the pipeline.
///
/// Rejections become `403 text/plain`.
pub async fn enforce_access(
    State(pipeline): State<Arc<Pipeline>>,
    request: Request,
    next: Next,
) -> Response {
    let meta =
        RequestMeta::from_request_parts(request.uri(), request.headers(), pipeline.country_header());

    match pipeline.evaluate(&meta) {
        Verdict::Continue => next.run(request).await,
        Verdict::Reject(rejection) => GatewayError::AccessDenied(rejection).into_response(),
    }
}

// == Decoration Middleware ==
/// axum middleware that lets every stage annotate the outgoing response.
///
/// Mounted outside every other layer, so rejections and CORS preflight
/// answers are decorated too.
pub async fn decorate_responses(
    State(pipeline): State<Arc<Pipeline>>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;
    pipeline.decorate(response.headers_mut());
    response
}
