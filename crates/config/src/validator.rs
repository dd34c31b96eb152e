use crate::*;
use thiserror::Error;
use url::Url;

/// Timeouts above this produce a warning
pub const MAX_RECOMMENDED_TIMEOUT_SECS: u64 = 300;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Server host is required")]
    MissingHost,

    #[error("{field} must be between 1 and 65535")]
    InvalidPort { field: String },

    #[error("Upstream URL '{url}' is invalid: {message}")]
    InvalidUpstreamUrl { url: String, message: String },

    #[error("{field} contains an unresolved environment variable: {value}")]
    UnresolvedEnvVar { field: String, value: String },

    #[error("{field} must be a positive integer")]
    InvalidPositiveInteger { field: String },

    #[error("Staging directory is required")]
    MissingStagingDir,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, field: &str, message: impl Into<String>) {
        self.warnings.push(ValidationWarning {
            field: field.to_string(),
            message: message.into(),
        });
    }
}

pub fn validate_config(config: &GatewayConfig) -> ValidationReport {
    let mut report = ValidationReport::new();

    validate_server(&config.server, &mut report);
    validate_upstream(&config.upstream, &mut report);
    validate_uploads(&config.uploads, &mut report);
    validate_metrics(config, &mut report);

    report
}

fn validate_server(server: &ServerSettings, report: &mut ValidationReport) {
    if server.host.trim().is_empty() {
        report.add_error(ValidationError::MissingHost);
    } else if has_unresolved_env_vars(&server.host) {
        report.add_error(ValidationError::UnresolvedEnvVar {
            field: "server.host".to_string(),
            value: server.host.clone(),
        });
    }

    validate_port("server.port", server.port, report);
}

fn validate_port(field: &str, port: u16, report: &mut ValidationReport) {
    if port == 0 {
        report.add_error(ValidationError::InvalidPort {
            field: field.to_string(),
        });
    } else if port < 1024 {
        report.add_warning(
            field,
            format!("Port {} is privileged and needs elevated permissions", port),
        );
    }
}

fn validate_upstream(upstream: &UpstreamConfig, report: &mut ValidationReport) {
    let url = &upstream.base_url;

    if has_unresolved_env_vars(url) {
        report.add_error(ValidationError::UnresolvedEnvVar {
            field: "upstream.base_url".to_string(),
            value: url.clone(),
        });
    } else {
        match Url::parse(url) {
            Ok(parsed) if !matches!(parsed.scheme(), "http" | "https") => {
                report.add_error(ValidationError::InvalidUpstreamUrl {
                    url: url.clone(),
                    message: format!("scheme must be http or https, got '{}'", parsed.scheme()),
                });
            }
            Ok(parsed) if parsed.host_str().is_none() => {
                report.add_error(ValidationError::InvalidUpstreamUrl {
                    url: url.clone(),
                    message: "host is missing".to_string(),
                });
            }
            Ok(_) => {}
            Err(e) => {
                report.add_error(ValidationError::InvalidUpstreamUrl {
                    url: url.clone(),
                    message: e.to_string(),
                });
            }
        }
    }

    if upstream.timeout_secs == 0 {
        report.add_error(ValidationError::InvalidPositiveInteger {
            field: "upstream.timeout_secs".to_string(),
        });
    } else if upstream.timeout_secs > MAX_RECOMMENDED_TIMEOUT_SECS {
        report.add_warning(
            "upstream.timeout_secs",
            format!(
                "{}s is unusually long; clients may give up before the upstream answers",
                upstream.timeout_secs
            ),
        );
    }
}

fn validate_uploads(uploads: &UploadsConfig, report: &mut ValidationReport) {
    if uploads.staging_dir.as_os_str().is_empty() {
        report.add_error(ValidationError::MissingStagingDir);
    } else if uploads.staging_dir.is_relative() {
        report.add_warning(
            "uploads.staging_dir",
            format!(
                "{:?} is relative and resolves against the working directory",
                uploads.staging_dir
            ),
        );
    }

    if uploads.max_upload_bytes == 0 {
        report.add_error(ValidationError::InvalidPositiveInteger {
            field: "uploads.max_upload_bytes".to_string(),
        });
    }
}

fn validate_metrics(config: &GatewayConfig, report: &mut ValidationReport) {
    let Some(port) = config.metrics.port else {
        return;
    };

    validate_port("metrics.port", port, report);
    if port == config.server.port {
        report.add_error(ValidationError::InvalidPort {
            field: "metrics.port (same as server.port)".to_string(),
        });
    }
}
