//! Configuration Module
//!
//! Handles loading and managing gateway configuration from environment variables.

use std::env;
use std::path::PathBuf;

use crate::gateway::AccessPolicy;

/// Gateway configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Directory static assets are served from
    pub asset_root: PathBuf,
    /// Access-control lists handed to the pipeline
    pub policy: AccessPolicy,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `PORT` - HTTP server port (default: 3000)
    /// - `ASSET_ROOT` - Static asset directory (default: `public`)
    /// - `ALLOWED_COUNTRIES` - Comma-separated country codes (default: `JP`)
    /// - `ALLOWED_ORIGIN` - Referer prefix for protected paths
    pub fn from_env() -> Self {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Creates a Config from an arbitrary variable lookup.
    pub fn from_vars<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let mut policy = defaults.policy;

        if let Some(countries) = lookup("ALLOWED_COUNTRIES") {
            policy.allowed_countries = countries.split(',').map(str::to_string).collect();
        }
        if let Some(origin) = lookup("ALLOWED_ORIGIN").filter(|v| !v.trim().is_empty()) {
            policy.allowed_origin = origin.trim().to_string();
        }

        Self {
            server_port: lookup("PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.server_port),
            asset_root: lookup("ASSET_ROOT")
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.asset_root),
            policy: policy.normalized(),
        }
    }

    /// Full path of the home document inside the asset root.
    pub fn home_document_path(&self) -> PathBuf {
        self.asset_root.join(&self.policy.home_document)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            asset_root: PathBuf::from("public"),
            policy: AccessPolicy::default().normalized(),
        }
    }
}
