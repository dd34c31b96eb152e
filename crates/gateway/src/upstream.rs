//! Upstream client - trait and HTTP implementation
//!
//! The gateway never talks HTTP to the upstream directly; it goes through the
//! [`Upstream`] trait so the forwarding policy can be tested without a live
//! backend.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client, Response};
use serde::Serialize;
use std::time::Duration;
use tokio_util::io::ReaderStream;
use tracing::{debug, error};

use crate::error::UpstreamError;
use crate::staging::StagedUpload;
use crate::types::{Credentials, DocumentOwner, Registration, UpstreamReply};

/// Result type for upstream calls
pub type UpstreamResult<T> = std::result::Result<T, UpstreamError>;

/// Upstream paths
pub mod paths {
    pub const LOGIN: &str = "/login";
    pub const REGISTER: &str = "/register";
    pub const UPLOAD_DOCUMENT: &str = "/upload-document";
    pub const LIST_DOCUMENTS: &str = "/list-documents";
}

/// Client trait for the upstream authentication/document service
///
/// Every method performs exactly one request. Any HTTP status with a JSON
/// body is an `Ok` reply; only transport failures, timeouts and unparseable
/// bodies are errors.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Upstream: Send + Sync {
    async fn login(&self, credentials: &Credentials) -> UpstreamResult<UpstreamReply>;

    async fn register(&self, registration: &Registration) -> UpstreamResult<UpstreamReply>;

    /// Stream a staged file and the owner's email as a multipart form
    async fn upload_document(
        &self,
        email: &str,
        upload: &StagedUpload,
    ) -> UpstreamResult<UpstreamReply>;

    async fn list_documents(&self, owner: &DocumentOwner) -> UpstreamResult<UpstreamReply>;
}

// ==================== HTTP Implementation ====================

/// reqwest-based upstream client
#[derive(Clone)]
pub struct HttpUpstream {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl HttpUpstream {
    /// Create a client for the upstream at `base_url`, bounding every call by `timeout`
    pub fn new(base_url: &str, timeout: Duration) -> UpstreamResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post_json<T: Serialize + ?Sized + Sync>(
        &self,
        path: &str,
        body: &T,
    ) -> UpstreamResult<UpstreamReply> {
        let url = self.url(path);
        debug!(%url, "Forwarding JSON request");

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| self.transport_error(path, e))?;

        self.read_reply(path, response).await
    }

    async fn read_reply(&self, path: &str, response: Response) -> UpstreamResult<UpstreamReply> {
        let status = response.status().as_u16();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(path, e))?;

        let body = serde_json::from_slice(&bytes).map_err(|e| {
            error!(path, status, %e, "Upstream returned a non-JSON body");
            UpstreamError::Malformed(format!("status {}: {}", status, e))
        })?;

        debug!(path, status, "Upstream replied");
        Ok(UpstreamReply::new(status, body))
    }

    fn transport_error(&self, path: &str, err: reqwest::Error) -> UpstreamError {
        error!(path, %err, "Upstream request failed");
        UpstreamError::from_reqwest(err, self.timeout)
    }
}

#[async_trait]
impl Upstream for HttpUpstream {
    async fn login(&self, credentials: &Credentials) -> UpstreamResult<UpstreamReply> {
        self.post_json(paths::LOGIN, credentials).await
    }

    async fn register(&self, registration: &Registration) -> UpstreamResult<UpstreamReply> {
        self.post_json(paths::REGISTER, registration).await
    }

    async fn upload_document(
        &self,
        email: &str,
        upload: &StagedUpload,
    ) -> UpstreamResult<UpstreamReply> {
        let file = tokio::fs::File::open(upload.path())
            .await
            .map_err(|e| UpstreamError::Transport(format!("cannot read staged upload: {}", e)))?;

        let part = Part::stream_with_length(Body::wrap_stream(ReaderStream::new(file)), upload.len())
            .file_name(upload.filename().to_string())
            .mime_str(upload.content_type())
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;

        let form = Form::new()
            .part("file", part)
            .text("email", email.to_string());

        let url = self.url(paths::UPLOAD_DOCUMENT);
        debug!(%url, id = %upload.id(), bytes = upload.len(), "Forwarding upload");

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| self.transport_error(paths::UPLOAD_DOCUMENT, e))?;

        self.read_reply(paths::UPLOAD_DOCUMENT, response).await
    }

    async fn list_documents(&self, owner: &DocumentOwner) -> UpstreamResult<UpstreamReply> {
        self.post_json(paths::LIST_DOCUMENTS, owner).await
    }
}
