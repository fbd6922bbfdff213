//! Access Policy
//!
//! Immutable allow/block lists and path rules consumed by the access stages.

/// Sentinel used when the country header is absent.
pub const UNKNOWN_COUNTRY: &str = "UNKNOWN";

/// Header set by the edge network carrying the client's country code.
pub const DEFAULT_COUNTRY_HEADER: &str = "cf-ipcountry";

/// Origin whose pages may load protected paths.
pub const DEFAULT_ALLOWED_ORIGIN: &str = "https://welnessclass.shop";

const DEFAULT_BLOCKED_AGENTS: &[&str] = &[
    "bot",
    "crawl",
    "spider",
    "slurp",
    "bing",
    "ahrefs",
    "semrush",
    "facebookexternalhit",
    "python-requests",
    "curl",
    "wget",
    "java",
    "headless",
    "node",
];

// == Access Policy ==
/// Configuration for the access-control pipeline.
///
/// Values are normalized once through [`AccessPolicy::normalized`] so the
/// stages can compare without re-casing the lists on every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessPolicy {
    /// Country codes allowed through (compared upper-cased)
    pub allowed_countries: Vec<String>,
    /// Request header carrying the country code
    pub country_header: String,
    /// User-agent substrings that mark an automated client (lower-cased)
    pub blocked_agents: Vec<String>,
    /// Referer prefix that unlocks protected paths (lower-cased)
    pub allowed_origin: String,
    /// Path prefixes always served without a referer check
    pub asset_prefixes: Vec<String>,
    /// File extensions always served without a referer check
    pub passthrough_extensions: Vec<String>,
    /// File name of the single-page-app entry document
    pub home_document: String,
    /// Path of the embeddability self-check endpoint
    pub loader_path: String,
}

impl AccessPolicy {
    /// Returns the policy with casing normalized and empty agent tokens dropped.
    ///
    /// An empty token would be contained in every user agent and block all traffic.
    pub fn normalized(mut self) -> Self {
        self.allowed_countries = self
            .allowed_countries
            .iter()
            .map(|code| code.trim().to_uppercase())
            .filter(|code| !code.is_empty())
            .collect();
        self.blocked_agents = self
            .blocked_agents
            .iter()
            .map(|token| token.trim().to_lowercase())
            .filter(|token| !token.is_empty())
            .collect();
        self.allowed_origin = self.allowed_origin.to_lowercase();
        self.country_header = self.country_header.to_lowercase();
        self
    }
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self {
            allowed_countries: vec!["JP".to_string()],
            country_header: DEFAULT_COUNTRY_HEADER.to_string(),
            blocked_agents: DEFAULT_BLOCKED_AGENTS
                .iter()
                .map(|token| token.to_string())
                .collect(),
            allowed_origin: DEFAULT_ALLOWED_ORIGIN.to_string(),
            asset_prefixes: vec!["/css/".into(), "/js/".into(), "/images/".into()],
            passthrough_extensions: vec![".mp4".into()],
            home_document: "index.html".to_string(),
            loader_path: "/frontend-loader".to_string(),
        }
    }
}
