//! Access Stages
//!
//! The concrete stages of the gateway pipeline, in evaluation order:
//! embedding policy, geography, automated client, origin control.

use axum::http::{header, HeaderMap, HeaderValue};
use tracing::warn;

use super::policy::{AccessPolicy, UNKNOWN_COUNTRY};
use super::stage::{RequestMeta, Stage, Verdict};
use crate::error::Rejection;

// == Embedding Policy ==
/// Allows the frontend to be framed by any origin. Never rejects.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmbeddingPolicyStage;

impl Stage for EmbeddingPolicyStage {
    fn name(&self) -> &'static str {
        "embedding"
    }

    fn check(&self, _request: &RequestMeta) -> Verdict {
        Verdict::Continue
    }

    fn decorate(&self, headers: &mut HeaderMap) {
        headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("ALLOWALL"));
        headers.insert(
            header::CONTENT_SECURITY_POLICY,
            HeaderValue::from_static("frame-ancestors *"),
        );
    }
}

// == Geography ==
/// Rejects countries outside the allow-list; fails open when the signal is missing.
#[derive(Debug, Clone)]
pub struct GeographyStage {
    allowed: Vec<String>,
}

impl GeographyStage {
    /// `allowed` must already be upper-cased.
    pub fn new(allowed: Vec<String>) -> Self {
        Self { allowed }
    }
}

impl Stage for GeographyStage {
    fn name(&self) -> &'static str {
        "geography"
    }

    fn check(&self, request: &RequestMeta) -> Verdict {
        let country = request
            .country
            .as_deref()
            .filter(|code| !code.is_empty())
            .map(str::to_uppercase)
            .unwrap_or_else(|| UNKNOWN_COUNTRY.to_string());

        if country == UNKNOWN_COUNTRY {
            warn!(path = %request.path, "Country header missing, allowing request");
            return Verdict::Continue;
        }

        if self.allowed.iter().any(|code| *code == country) {
            Verdict::Continue
        } else {
            Verdict::Reject(Rejection::Country)
        }
    }
}

// == Automated Client ==
/// Rejects user agents containing any blocklisted token.
#[derive(Debug, Clone)]
pub struct AutomatedClientStage {
    blocked: Vec<String>,
}

impl AutomatedClientStage {
    /// `blocked` must already be lower-cased and free of empty tokens.
    pub fn new(blocked: Vec<String>) -> Self {
        Self { blocked }
    }
}

impl Stage for AutomatedClientStage {
    fn name(&self) -> &'static str {
        "automated-client"
    }

    fn check(&self, request: &RequestMeta) -> Verdict {
        let agent = request
            .user_agent
            .as_deref()
            .unwrap_or_default()
            .to_lowercase();

        if self.blocked.iter().any(|token| agent.contains(token.as_str())) {
            Verdict::Reject(Rejection::Bot)
        } else {
            Verdict::Continue
        }
    }
}

// == Origin Control ==
/// Requires a referer from the allowed origin, except on public paths.
#[derive(Debug, Clone)]
pub struct OriginControlStage {
    allowed_origin: String,
    asset_prefixes: Vec<String>,
    passthrough_extensions: Vec<String>,
    home_document: String,
    loader_path: String,
}

impl OriginControlStage {
    /// Takes the origin and path rules from a normalized policy.
    pub fn new(policy: &AccessPolicy) -> Self {
        Self {
            allowed_origin: policy.allowed_origin.to_lowercase(),
            asset_prefixes: policy.asset_prefixes.clone(),
            passthrough_extensions: policy.passthrough_extensions.clone(),
            home_document: policy.home_document.clone(),
            loader_path: policy.loader_path.clone(),
        }
    }

    /// Paths served to anyone: assets, videos, the root, the home document, the loader.
    pub fn is_public_path(&self, path: &str) -> bool {
        self.asset_prefixes
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
            || self
                .passthrough_extensions
                .iter()
                .any(|ext| path.ends_with(ext.as_str()))
            || path == "/"
            || path.ends_with(self.home_document.as_str())
            || path == self.loader_path
    }
}

impl Stage for OriginControlStage {
    fn name(&self) -> &'static str {
        "origin-control"
    }

    fn check(&self, request: &RequestMeta) -> Verdict {
        if self.is_public_path(&request.path) {
            return Verdict::Continue;
        }

        let referer = request
            .referer
            .as_deref()
            .unwrap_or_default()
            .to_lowercase();
        if referer.starts_with(self.allowed_origin.as_str()) {
            return Verdict::Continue;
        }

        if request.wants_loader() {
            Verdict::Reject(Rejection::DirectLoader)
        } else {
            Verdict::Reject(Rejection::DirectAccess)
        }
    }
}
