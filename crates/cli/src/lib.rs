use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "docgate")]
#[command(about = "docgate - forwarding gateway for login, signup and document storage")]
#[command(version)]
pub struct Cli {
    /// Log output format
    #[arg(long, global = true, value_enum, env = "LOG_FORMAT", default_value = "pretty")]
    pub log_format: LogFormatArg,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the gateway
    Start {
        /// Path to a YAML configuration file (defaults are used without one)
        #[arg(short, long, env = "DOCGATE_CONFIG")]
        config: Option<PathBuf>,

        /// Host to listen on
        #[arg(long, env = "HOST")]
        host: Option<String>,

        /// Port to listen on
        #[arg(short, long, env = "PORT")]
        port: Option<u16>,

        /// Base URL of the upstream authentication/document service
        /// (`FLASK_SERVER_URL` is also read when `UPSTREAM_URL` is unset)
        #[arg(long, env = "UPSTREAM_URL")]
        upstream_url: Option<String>,

        /// Upstream request timeout in seconds
        #[arg(long, env = "UPSTREAM_TIMEOUT_SECS")]
        upstream_timeout: Option<u64>,

        /// Directory uploads are staged in before forwarding
        #[arg(long, env = "STAGING_DIR")]
        staging_dir: Option<PathBuf>,

        /// Maximum accepted request body size in bytes
        #[arg(long, env = "MAX_UPLOAD_BYTES")]
        max_upload_bytes: Option<usize>,

        /// Expose Prometheus metrics on this port
        #[arg(long, env = "METRICS_PORT")]
        metrics_port: Option<u16>,
    },

    /// Validate configuration without starting the gateway
    Validate {
        /// Path to the configuration file
        #[arg(short, long, default_value = "docgate.yaml")]
        config: PathBuf,
    },

    /// Write a configuration file with all defaults
    Init {
        /// Output path for the new configuration file
        #[arg(short, long, default_value = "docgate.yaml")]
        output: PathBuf,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormatArg {
    /// Human-readable, colored
    Pretty,
    /// One JSON object per line
    Json,
    /// Single-line, terse
    Compact,
}

impl LogFormatArg {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormatArg::Pretty => "pretty",
            LogFormatArg::Json => "json",
            LogFormatArg::Compact => "compact",
        }
    }
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

/// Older deployments name the upstream with this variable
pub const LEGACY_UPSTREAM_URL_ENV: &str = "FLASK_SERVER_URL";

/// Upstream URL from `--upstream-url` / `UPSTREAM_URL`, else `FLASK_SERVER_URL`
pub fn resolve_upstream_url(explicit: Option<String>) -> Option<String> {
    resolve_upstream_url_with(explicit, |key| std::env::var(key).ok())
}

fn resolve_upstream_url_with(
    explicit: Option<String>,
    lookup: impl Fn(&str) -> Option<String>,
) -> Option<String> {
    explicit.or_else(|| lookup(LEGACY_UPSTREAM_URL_ENV).filter(|url| !url.trim().is_empty()))
}
