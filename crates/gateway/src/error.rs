//! Gateway error types

use std::io;
use std::time::Duration;
use thiserror::Error;

use crate::types::UpstreamReply;

/// Failure to obtain a usable reply from the upstream service
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UpstreamError {
    /// Connection refused, reset, DNS failure and the like
    #[error("Upstream unreachable: {0}")]
    Transport(String),

    #[error("Upstream did not answer within {0:?}")]
    Timeout(Duration),

    /// The upstream answered with something that is not the expected JSON
    #[error("Malformed upstream response: {0}")]
    Malformed(String),
}

impl UpstreamError {
    /// Classify a reqwest error, keeping timeouts distinct
    pub fn from_reqwest(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            Self::Timeout(timeout)
        } else if err.is_decode() {
            Self::Malformed(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

/// Errors surfaced by gateway operations
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("No file uploaded")]
    MissingFile,

    #[error("No email provided")]
    MissingEmail,

    /// The inbound multipart body could not be read
    #[error("Invalid upload form: {0}")]
    InvalidForm(String),

    #[error("Failed to stage upload: {0}")]
    Staging(#[from] io::Error),

    /// The upstream answered with a non-2xx status and a structured body
    #[error("Upstream rejected request with status {}", .0.status)]
    Rejected(UpstreamReply),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

/// Result type for gateway operations
pub type Result<T> = std::result::Result<T, GatewayError>;
