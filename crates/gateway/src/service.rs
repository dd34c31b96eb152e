//! The forwarding gateway
//!
//! Each operation performs at most one upstream call and translates its
//! outcome. Nothing is retried and nothing is kept between requests.

use observability::metrics::ForwardTimer;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use crate::error::{GatewayError, Result, UpstreamError};
use crate::staging::{StagedUpload, StagingArea};
use crate::types::*;
use crate::upstream::Upstream;

/// Forwards client requests to the upstream service
#[derive(Clone)]
pub struct Gateway {
    upstream: Arc<dyn Upstream>,
    staging: StagingArea,
}

impl Gateway {
    pub fn new(upstream: Arc<dyn Upstream>, staging: StagingArea) -> Self {
        Self { upstream, staging }
    }

    pub fn staging(&self) -> &StagingArea {
        &self.staging
    }

    /// Forward a login; success redirects to the dashboard for that email
    #[instrument(skip_all, fields(email = %credentials.email))]
    pub async fn login(&self, credentials: &Credentials) -> Outcome {
        let mut timer = ForwardTimer::start("login");

        match self.upstream.login(credentials).await {
            Ok(reply) if reply.has_marker(LOGIN_SUCCESS_MARKER) => {
                info!("Login successful, redirecting to dashboard");
                timer.set_outcome("success");
                Outcome::success(dashboard_redirect(&credentials.email))
            }
            Ok(reply) => {
                info!(status = reply.status, "Login rejected by upstream");
                timer.set_outcome("rejected");
                Outcome::failure(LOGIN_REJECTED_MESSAGE, LOGIN_PAGE)
            }
            Err(e) => {
                error!(%e, "Login could not be forwarded");
                timer.set_outcome(unavailable_outcome(&e));
                Outcome::failure(LOGIN_UNAVAILABLE_MESSAGE, LOGIN_PAGE)
            }
        }
    }

    /// Forward a registration; success sends the user to the login page
    #[instrument(skip_all, fields(email = %registration.email))]
    pub async fn signup(&self, registration: &Registration) -> Outcome {
        let mut timer = ForwardTimer::start("signup");

        match self.upstream.register(registration).await {
            Ok(reply) if reply.has_marker(REGISTER_SUCCESS_MARKER) => {
                info!("Registration successful");
                timer.set_outcome("success");
                Outcome::success_with_notice(LOGIN_PAGE, SIGNUP_SUCCESS_NOTICE)
            }
            Ok(reply) => {
                info!(status = reply.status, "Registration rejected by upstream");
                timer.set_outcome("rejected");
                Outcome::failure(SIGNUP_REJECTED_MESSAGE, REGISTER_PAGE)
            }
            Err(e) => {
                error!(%e, "Registration could not be forwarded");
                timer.set_outcome(unavailable_outcome(&e));
                Outcome::failure(SIGNUP_UNAVAILABLE_MESSAGE, REGISTER_PAGE)
            }
        }
    }

    /// Forward an already staged upload and return the upstream reply verbatim
    ///
    /// The staged file is consumed: it is deleted when this returns, whatever
    /// the result, including the validation failures checked here.
    #[instrument(skip_all, fields(email = email.as_deref().unwrap_or_default()))]
    pub async fn upload_document(
        &self,
        email: Option<String>,
        upload: Option<StagedUpload>,
    ) -> Result<UpstreamReply> {
        let Some(upload) = upload else {
            warn!("No file uploaded");
            return Err(GatewayError::MissingFile);
        };
        let email = present(email).ok_or_else(|| {
            warn!("No email provided");
            GatewayError::MissingEmail
        })?;

        let mut timer = ForwardTimer::start("upload_document");
        info!(id = %upload.id(), filename = upload.filename(), bytes = upload.len(), "Uploading document");

        let result = self.upstream.upload_document(&email, &upload).await;
        drop(upload);

        match result {
            Ok(reply) if reply.is_success() => {
                timer.set_outcome("success");
                Ok(reply)
            }
            Ok(reply) => {
                warn!(status = reply.status, "Upload rejected by upstream");
                timer.set_outcome("rejected");
                Ok(reply)
            }
            Err(e) => {
                error!(%e, "Error uploading document");
                timer.set_outcome(unavailable_outcome(&e));
                Err(e.into())
            }
        }
    }

    /// Stage an in-memory blob and forward it
    ///
    /// An empty blob counts as no file and is rejected before anything is staged.
    pub async fn upload_bytes(
        &self,
        email: Option<String>,
        bytes: &[u8],
        filename: &str,
        content_type: &str,
    ) -> Result<UpstreamReply> {
        if bytes.is_empty() {
            return self.upload_document(email, None).await;
        }
        let staged = self
            .staging
            .stage_bytes(filename, content_type, bytes)
            .await?;
        self.upload_document(email, Some(staged)).await
    }

    /// Forward a listing request and return the upstream payload unchanged
    ///
    /// A non-2xx reply is returned as [`GatewayError::Rejected`] so callers can
    /// pass it through.
    #[instrument(skip_all, fields(email = %email))]
    pub async fn list_documents(&self, email: &str) -> Result<DocumentList> {
        if email.trim().is_empty() {
            warn!("No email provided");
            return Err(GatewayError::MissingEmail);
        }

        let mut timer = ForwardTimer::start("list_documents");
        let owner = DocumentOwner {
            email: email.to_string(),
        };

        let reply = match self.upstream.list_documents(&owner).await {
            Ok(reply) => reply,
            Err(e) => {
                error!(%e, "Error listing documents");
                timer.set_outcome(unavailable_outcome(&e));
                return Err(e.into());
            }
        };

        if !reply.is_success() {
            warn!(status = reply.status, "Listing rejected by upstream");
            timer.set_outcome("rejected");
            return Err(GatewayError::Rejected(reply));
        }

        timer.set_outcome("success");
        Ok(reply.body)
    }
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn unavailable_outcome(err: &UpstreamError) -> &'static str {
    match err {
        UpstreamError::Transport(_) => "unreachable",
        UpstreamError::Timeout(_) => "timeout",
        UpstreamError::Malformed(_) => "malformed",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{spawn_stub, staged_files};
    use crate::upstream::{paths, HttpUpstream, MockUpstream};
    use assert_matches::assert_matches;
    use axum::extract::Multipart;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::json;
    use std::time::{Duration, Instant};
    use tempfile::TempDir;

    fn gateway(mock: MockUpstream) -> (Gateway, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let gateway = Gateway::new(Arc::new(mock), StagingArea::new(dir.path()));
        (gateway, dir)
    }

    fn reply(status: u16, body: serde_json::Value) -> UpstreamReply {
        UpstreamReply::new(status, body)
    }

    // ==================== login ====================

    #[tokio::test]
    async fn test_login_success_redirects_with_email() {
        let mut mock = MockUpstream::new();
        mock.expect_login()
            .withf(|c: &Credentials| c.email == "jane@example.com" && c.password == "pw")
            .times(1)
            .returning(|_| Ok(reply(200, json!({ "message": LOGIN_SUCCESS_MARKER }))));
        let (gateway, _dir) = gateway(mock);

        let outcome = gateway
            .login(&Credentials::new("jane@example.com", "pw"))
            .await;

        assert_eq!(
            outcome,
            Outcome::success("/dashboard?email=jane%40example.com")
        );
    }

    #[tokio::test]
    async fn test_login_rejection_hides_upstream_message() {
        let mut mock = MockUpstream::new();
        mock.expect_login()
            .returning(|_| Ok(reply(401, json!({ "message": "Invalid username or password" }))));
        let (gateway, _dir) = gateway(mock);

        let outcome = gateway.login(&Credentials::new("a@b.com", "bad")).await;

        assert_eq!(outcome, Outcome::failure(LOGIN_REJECTED_MESSAGE, LOGIN_PAGE));
    }

    #[tokio::test]
    async fn test_login_success_status_without_marker_fails() {
        let mut mock = MockUpstream::new();
        mock.expect_login()
            .returning(|_| Ok(reply(200, json!({ "message": "Welcome back" }))));
        let (gateway, _dir) = gateway(mock);

        let outcome = gateway.login(&Credentials::new("a@b.com", "pw")).await;

        assert_eq!(outcome, Outcome::failure(LOGIN_REJECTED_MESSAGE, LOGIN_PAGE));
    }

    #[tokio::test]
    async fn test_login_transport_failure_asks_to_retry_later() {
        for err in [
            UpstreamError::Transport("connection refused".into()),
            UpstreamError::Timeout(Duration::from_secs(30)),
            UpstreamError::Malformed("expected value".into()),
        ] {
            let mut mock = MockUpstream::new();
            mock.expect_login()
                .times(1)
                .returning(move |_| Err(err.clone()));
            let (gateway, _dir) = gateway(mock);

            let outcome = gateway.login(&Credentials::new("a@b.com", "pw")).await;

            assert_eq!(outcome, Outcome::failure(LOGIN_UNAVAILABLE_MESSAGE, LOGIN_PAGE));
            assert_ne!(LOGIN_UNAVAILABLE_MESSAGE, LOGIN_REJECTED_MESSAGE);
        }
    }

    // ==================== signup ====================

    #[tokio::test]
    async fn test_signup_success_marker() {
        let mut mock = MockUpstream::new();
        mock.expect_register()
            .withf(|r: &Registration| r.name == "Ann" && r.email == "ann@example.com")
            .times(1)
            .returning(|_| Ok(reply(200, json!({ "message": REGISTER_SUCCESS_MARKER }))));
        let (gateway, _dir) = gateway(mock);

        let outcome = gateway
            .signup(&Registration::new("Ann", "ann@example.com", "pw"))
            .await;

        assert_eq!(
            outcome,
            Outcome::success_with_notice(LOGIN_PAGE, SIGNUP_SUCCESS_NOTICE)
        );
    }

    #[tokio::test]
    async fn test_signup_other_markers_fail() {
        for body in [
            json!({ "message": "successfully registered" }),
            json!({ "message": "Successfully registered!" }),
            json!({ "message": "Failed to register user", "result": false }),
            json!({ "error": "Missing 'name' in request data" }),
        ] {
            let mut mock = MockUpstream::new();
            mock.expect_register()
                .returning(move |_| Ok(reply(200, body.clone())));
            let (gateway, _dir) = gateway(mock);

            let outcome = gateway
                .signup(&Registration::new("Ann", "ann@example.com", "pw"))
                .await;

            assert_eq!(
                outcome,
                Outcome::failure(SIGNUP_REJECTED_MESSAGE, REGISTER_PAGE)
            );
        }
    }

    #[tokio::test]
    async fn test_signup_transport_failure() {
        let mut mock = MockUpstream::new();
        mock.expect_register()
            .returning(|_| Err(UpstreamError::Transport("reset".into())));
        let (gateway, _dir) = gateway(mock);

        let outcome = gateway.signup(&Registration::default()).await;

        assert_eq!(
            outcome,
            Outcome::failure(SIGNUP_UNAVAILABLE_MESSAGE, REGISTER_PAGE)
        );
    }

    // ==================== upload ====================

    #[tokio::test]
    async fn test_upload_without_file_makes_no_call_and_stages_nothing() {
        let mut mock = MockUpstream::new();
        mock.expect_upload_document().times(0);
        let (gateway, dir) = gateway(mock);

        let err = gateway
            .upload_document(Some("a@b.com".into()), None)
            .await
            .unwrap_err();
        assert_matches!(err, GatewayError::MissingFile);

        let err = gateway
            .upload_bytes(Some("a@b.com".into()), b"", "empty.pdf", "application/pdf")
            .await
            .unwrap_err();
        assert_matches!(err, GatewayError::MissingFile);

        assert_eq!(staged_files(dir.path()), 0);
    }

    #[tokio::test]
    async fn test_upload_without_email_cleans_up() {
        let mut mock = MockUpstream::new();
        mock.expect_upload_document().times(0);
        let (gateway, dir) = gateway(mock);

        for email in [None, Some(String::new()), Some("   ".to_string())] {
            let err = gateway
                .upload_bytes(email, b"data", "a.pdf", "application/pdf")
                .await
                .unwrap_err();
            assert_matches!(err, GatewayError::MissingEmail);
        }

        assert_eq!(staged_files(dir.path()), 0);
    }

    #[tokio::test]
    async fn test_upload_cleans_up_for_every_upstream_outcome() {
        let outcomes: Vec<UpstreamResult> = vec![
            Ok(reply(200, json!({ "message": "File uploaded successfully" }))),
            Ok(reply(400, json!({ "message": "No selected file" }))),
            Ok(reply(500, json!({ "message": "Failed to upload file: bucket gone" }))),
            Err(UpstreamError::Timeout(Duration::from_secs(30))),
            Err(UpstreamError::Malformed("expected value".into())),
            Err(UpstreamError::Transport("connection refused".into())),
        ];

        for outcome in outcomes {
            let expected = outcome.clone();
            let mut mock = MockUpstream::new();
            mock.expect_upload_document()
                .withf(|email: &str, upload: &StagedUpload| {
                    // The staged file exists while the call is in flight
                    email == "a@b.com" && upload.path().exists() && upload.len() == 4
                })
                .times(1)
                .returning(move |_, _| outcome.clone());
            let (gateway, dir) = gateway(mock);

            let result = gateway
                .upload_bytes(Some("a@b.com".into()), b"data", "a.pdf", "application/pdf")
                .await;

            match (result, expected) {
                (Ok(got), Ok(want)) => assert_eq!(got, want),
                (Err(GatewayError::Upstream(got)), Err(want)) => assert_eq!(got, want),
                (got, want) => panic!("unexpected result {:?} for {:?}", got, want),
            }
            assert_eq!(staged_files(dir.path()), 0);
        }
    }

    type UpstreamResult = std::result::Result<UpstreamReply, UpstreamError>;

    #[tokio::test]
    async fn test_cancelled_upload_cleans_up() {
        let router = Router::new().route(
            paths::UPLOAD_DOCUMENT,
            post(|| async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                Json(json!({ "message": "File uploaded successfully" }))
            }),
        );
        let base = spawn_stub(router).await;
        let dir = tempfile::tempdir().unwrap();
        let upstream = HttpUpstream::new(&base, Duration::from_secs(30)).unwrap();
        let gateway = Gateway::new(Arc::new(upstream), StagingArea::new(dir.path()));

        let call = gateway.upload_bytes(Some("a@b.com".into()), b"data", "a.pdf", "application/pdf");
        let timed_out = tokio::time::timeout(Duration::from_millis(200), call).await;

        assert!(timed_out.is_err());
        assert_eq!(staged_files(dir.path()), 0);
    }

    #[tokio::test]
    async fn test_concurrent_uploads_do_not_interfere() {
        // The upstream is slow for "slow@example.com" only and echoes what it got
        let router = Router::new().route(
            paths::UPLOAD_DOCUMENT,
            post(|mut multipart: Multipart| async move {
                let mut email = String::new();
                let mut content = Vec::new();
                while let Some(field) = multipart.next_field().await.unwrap() {
                    let name = field.name().map(str::to_owned);
                    match name.as_deref() {
                        Some("email") => email = field.text().await.unwrap(),
                        Some("file") => content = field.bytes().await.unwrap().to_vec(),
                        _ => {}
                    }
                }
                if email == "slow@example.com" {
                    tokio::time::sleep(Duration::from_millis(500)).await;
                }
                (
                    StatusCode::OK,
                    Json(json!({
                        "message": "File uploaded successfully",
                        "email": email,
                        "content": String::from_utf8(content).unwrap(),
                    })),
                )
            }),
        );
        let base = spawn_stub(router).await;
        let dir = tempfile::tempdir().unwrap();
        let upstream = HttpUpstream::new(&base, Duration::from_secs(5)).unwrap();
        let gateway = Gateway::new(Arc::new(upstream), StagingArea::new(dir.path()));

        let start = Instant::now();
        let slow = async {
            let reply = gateway
                .upload_bytes(Some("slow@example.com".into()), b"AAAA", "a.pdf", "application/pdf")
                .await
                .unwrap();
            (reply, start.elapsed())
        };
        let fast = async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            let reply = gateway
                .upload_bytes(Some("fast@example.com".into()), b"BBBB", "a.pdf", "application/pdf")
                .await
                .unwrap();
            (reply, start.elapsed())
        };

        let ((slow_reply, slow_elapsed), (fast_reply, fast_elapsed)) = tokio::join!(slow, fast);

        assert_eq!(slow_reply.body["content"], "AAAA");
        assert_eq!(fast_reply.body["content"], "BBBB");
        assert!(fast_elapsed < slow_elapsed);
        assert_eq!(staged_files(dir.path()), 0);
    }

    #[tokio::test]
    async fn test_upload_with_unparseable_content_type_is_forwarded() {
        let router = Router::new().route(
            paths::UPLOAD_DOCUMENT,
            post(|mut multipart: Multipart| async move {
                let mut content_type = String::new();
                while let Some(field) = multipart.next_field().await.unwrap() {
                    if field.name() == Some("file") {
                        content_type = field.content_type().unwrap_or_default().to_string();
                    }
                }
                Json(json!({ "message": "File uploaded successfully", "type": content_type }))
            }),
        );
        let base = spawn_stub(router).await;
        let dir = tempfile::tempdir().unwrap();
        let upstream = HttpUpstream::new(&base, Duration::from_secs(5)).unwrap();
        let gateway = Gateway::new(Arc::new(upstream), StagingArea::new(dir.path()));

        let reply = gateway
            .upload_bytes(Some("a@b.com".into()), b"abc", "a.pdf", "not a mime")
            .await
            .unwrap();

        assert_eq!(reply.status, 200);
        assert_eq!(reply.body["type"], "application/octet-stream");
        assert_eq!(staged_files(dir.path()), 0);
    }

    // ==================== list ====================

    #[tokio::test]
    async fn test_list_passthrough() {
        for body in [
            json!([]),
            json!(["a.pdf", "b.pdf"]),
            json!([{ "name": "a.pdf" }, 3]),
            json!({ "documents": ["a.pdf"] }),
        ] {
            let expected = body.clone();
            let mut mock = MockUpstream::new();
            mock.expect_list_documents()
                .withf(|owner: &DocumentOwner| owner.email == "a@b.com")
                .times(1)
                .returning(move |_| Ok(reply(200, body.clone())));
            let (gateway, _dir) = gateway(mock);

            let documents = gateway.list_documents("a@b.com").await.unwrap();

            assert_eq!(documents, expected);
        }
    }

    #[tokio::test]
    async fn test_list_requires_email() {
        let mut mock = MockUpstream::new();
        mock.expect_list_documents().times(0);
        let (gateway, _dir) = gateway(mock);

        let err = gateway.list_documents(" ").await.unwrap_err();

        assert_matches!(err, GatewayError::MissingEmail);
    }

    #[tokio::test]
    async fn test_list_rejection_is_passed_through() {
        let mut mock = MockUpstream::new();
        mock.expect_list_documents()
            .returning(|_| Ok(reply(400, json!({ "error": "Email is required" }))));
        let (gateway, _dir) = gateway(mock);

        let err = gateway.list_documents("a@b.com").await.unwrap_err();

        assert_matches!(err, GatewayError::Rejected(r) if r.status == 400 && r.body["error"] == "Email is required");
    }
}
