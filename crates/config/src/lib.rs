//! docgate configuration
//!
//! Values are layered: built-in defaults, then an optional YAML file (with
//! `${VAR}` substitution), then command-line/environment overrides.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub mod defaults;
pub mod parser;
pub mod substitution;
pub mod validator;

pub use defaults::*;
pub use parser::*;
pub use substitution::*;
pub use validator::*;

/// Top-level gateway configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct GatewayConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub uploads: UploadsConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Client-facing listener
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// The authentication/document service requests are forwarded to
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct UpstreamConfig {
    #[serde(default = "default_upstream_url")]
    pub base_url: String,
    /// Bound on every upstream call
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl UpstreamConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_upstream_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct UploadsConfig {
    /// Where uploads are staged before being forwarded
    #[serde(default = "default_staging_dir")]
    pub staging_dir: PathBuf,
    /// Limit on inbound request bodies
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl Default for UploadsConfig {
    fn default() -> Self {
        Self {
            staging_dir: default_staging_dir(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

/// Prometheus exporter; disabled when `port` is unset
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct MetricsConfig {
    #[serde(default)]
    pub port: Option<u16>,
}

/// Values given on the command line or through the environment
///
/// Each `Some` replaces the corresponding file or default value.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub upstream_url: Option<String>,
    pub upstream_timeout_secs: Option<u64>,
    pub staging_dir: Option<PathBuf>,
    pub max_upload_bytes: Option<usize>,
    pub metrics_port: Option<u16>,
}

impl GatewayConfig {
    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(host) = overrides.host {
            self.server.host = host;
        }
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
        if let Some(url) = overrides.upstream_url {
            self.upstream.base_url = url;
        }
        if let Some(secs) = overrides.upstream_timeout_secs {
            self.upstream.timeout_secs = secs;
        }
        if let Some(dir) = overrides.staging_dir {
            self.uploads.staging_dir = dir;
        }
        if let Some(limit) = overrides.max_upload_bytes {
            self.uploads.max_upload_bytes = limit;
        }
        if overrides.metrics_port.is_some() {
            self.metrics.port = overrides.metrics_port;
        }
    }
}
