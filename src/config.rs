//! Configuration management for actions-deps

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

/// Hostname of the public GitHub instance
pub const PUBLIC_HOSTNAME: &str = "github.com";

/// API endpoint of the public GitHub instance
pub const PUBLIC_API_ENDPOINT: &str = "https://api.github.com";

/// Default HTTP request timeout (10 seconds)
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Top-level configuration
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Source-control host the manifests were fetched from
    pub source: SourceConfig,
    /// HTTP client configuration
    pub http: HttpConfig,
}

/// Source-control host configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct SourceConfig {
    /// Hostname of the instance the repository lives on
    pub hostname: String,
    /// API endpoint for `hostname`, when it differs from the conventional one
    pub api_endpoint: Option<String>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            hostname: PUBLIC_HOSTNAME.to_string(),
            api_endpoint: None,
        }
    }
}

impl SourceConfig {
    /// Source configuration for a specific hostname
    pub fn for_hostname(hostname: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            api_endpoint: None,
        }
    }

    /// Whether the configured host is the public instance
    pub fn is_public(&self) -> bool {
        self.hostname.eq_ignore_ascii_case(PUBLIC_HOSTNAME)
    }

    /// REST API base URL for `host`.
    ///
    /// An explicit `api_endpoint` applies to the configured hostname only.
    /// Otherwise the public host maps to `api.github.com` and any other host
    /// to its Enterprise Server endpoint (`https://<host>/api/v3`).
    pub fn api_base(&self, host: &str) -> String {
        if let Some(endpoint) = &self.api_endpoint
            && host.eq_ignore_ascii_case(&self.hostname)
        {
            return endpoint.trim_end_matches('/').to_string();
        }

        if host.eq_ignore_ascii_case(PUBLIC_HOSTNAME) {
            PUBLIC_API_ENDPOINT.to_string()
        } else {
            format!("https://{}/api/v3", host.to_lowercase())
        }
    }
}

/// HTTP client configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct HttpConfig {
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    /// Parse configuration from a JSON value, falling back to defaults
    pub fn from_json(options: Option<serde_json::Value>) -> Self {
        match options {
            Some(value) => serde_json::from_value(value).unwrap_or_default(),
            None => Self::default(),
        }
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        toml::from_str(content).context("invalid configuration")
    }

    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("in {}", path.display()))
    }
}
