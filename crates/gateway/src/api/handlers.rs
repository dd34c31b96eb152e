//! HTTP request handlers for the gateway API.

use axum::extract::multipart::{Field, MultipartRejection};
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Json;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, warn};

use super::extract::JsonOrForm;
use super::models::*;
use crate::error::{GatewayError, Result};
use crate::service::Gateway;
use crate::staging::{StagedUpload, StagingArea, DEFAULT_CONTENT_TYPE};
use crate::types::{Credentials, DocumentOwner, Outcome, Registration, UpstreamReply};

/// POST /login
pub async fn login(
    State(gateway): State<Arc<Gateway>>,
    JsonOrForm(credentials): JsonOrForm<Credentials>,
) -> Response {
    outcome_response(gateway.login(&credentials).await)
}

/// POST /signup
pub async fn signup(
    State(gateway): State<Arc<Gateway>>,
    JsonOrForm(registration): JsonOrForm<Registration>,
) -> Response {
    outcome_response(gateway.signup(&registration).await)
}

/// POST /upload-document
///
/// Multipart body with a `file` part and an `email` field. The upstream reply
/// is relayed with its status and body.
pub async fn upload_document(
    State(gateway): State<Arc<Gateway>>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Response {
    let form = match multipart {
        Ok(multipart) => read_upload_form(gateway.staging(), multipart).await,
        Err(e) => Err(GatewayError::InvalidForm(e.body_text())),
    };

    let result = match form {
        Ok(form) => gateway.upload_document(form.email, form.file).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(reply) => reply_response(reply),
        Err(e) => error_response(e, Endpoint::Upload),
    }
}

/// POST /list-documents
pub async fn list_documents(
    State(gateway): State<Arc<Gateway>>,
    JsonOrForm(owner): JsonOrForm<DocumentOwner>,
) -> Response {
    match gateway.list_documents(&owner.email).await {
        Ok(documents) => Json(documents).into_response(),
        Err(e) => error_response(e, Endpoint::List),
    }
}

// ==================== Upload form ====================

/// Fields read from an upload form
#[derive(Debug, Default)]
pub struct UploadForm {
    pub email: Option<String>,
    pub file: Option<StagedUpload>,
}

/// Read the multipart body, streaming the `file` part into the staging area
///
/// Anything staged is dropped, and so deleted, if reading fails part-way.
pub async fn read_upload_form(staging: &StagingArea, mut multipart: Multipart) -> Result<UploadForm> {
    let mut form = UploadForm::default();
    let mut seen_file = false;

    while let Some(mut field) = multipart.next_field().await.map_err(invalid_form)? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("email") => {
                form.email = Some(field.text().await.map_err(invalid_form)?);
            }
            Some("file") => {
                if seen_file {
                    return Err(GatewayError::InvalidForm("more than one file part".into()));
                }
                seen_file = true;
                form.file = stage_field(staging, &mut field).await?;
            }
            other => debug!(field = ?other, "Ignoring unexpected form field"),
        }
    }

    Ok(form)
}

/// Stage one file part, chunk by chunk
///
/// Nothing is created on disk until the first non-empty chunk arrives, so an
/// empty part yields `None`.
async fn stage_field(staging: &StagingArea, field: &mut Field<'_>) -> Result<Option<StagedUpload>> {
    let filename = field.file_name().unwrap_or_default().to_string();
    let content_type = field
        .content_type()
        .unwrap_or(DEFAULT_CONTENT_TYPE)
        .to_string();

    let mut staged: Option<StagedUpload> = None;
    while let Some(chunk) = field.chunk().await.map_err(invalid_form)? {
        if chunk.is_empty() {
            continue;
        }
        if staged.is_none() {
            staged = Some(staging.begin(filename.clone(), content_type.clone())?);
        }
        if let Some(upload) = staged.as_mut() {
            upload.write(&chunk).await?;
        }
    }

    if let Some(upload) = staged.as_mut() {
        upload.finish().await?;
    }
    Ok(staged)
}

fn invalid_form(err: axum::extract::multipart::MultipartError) -> GatewayError {
    GatewayError::InvalidForm(err.body_text())
}

// ==================== Responses ====================

#[derive(Debug, Clone, Copy)]
enum Endpoint {
    Upload,
    List,
}

/// Turn a login/signup outcome into a redirect or an alert page
pub fn outcome_response(outcome: Outcome) -> Response {
    match outcome {
        Outcome::Success {
            redirect,
            notice: None,
        } => Redirect::to(&redirect).into_response(),
        Outcome::Success {
            redirect,
            notice: Some(message),
        }
        | Outcome::Failure { message, redirect } => {
            Html(alert_and_redirect(&message, &redirect)).into_response()
        }
    }
}

/// Small HTML page that shows `message` and then navigates to `target`
pub fn alert_and_redirect(message: &str, target: &str) -> String {
    format!(
        "<script>alert({}); window.location.href = {};</script>",
        script_literal(message),
        script_literal(target),
    )
}

// A JSON string is a valid JS literal; "</" is split so it cannot close the script tag.
fn script_literal(value: &str) -> String {
    Value::from(value).to_string().replace("</", "<\\/")
}

fn reply_response(reply: UpstreamReply) -> Response {
    let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::BAD_GATEWAY);
    (status, Json(reply.body)).into_response()
}

fn error_response(err: GatewayError, endpoint: Endpoint) -> Response {
    let (status, message) = match err {
        GatewayError::Rejected(reply) => return reply_response(reply),
        GatewayError::MissingFile => (StatusCode::BAD_REQUEST, MISSING_FILE_MESSAGE),
        GatewayError::MissingEmail => match endpoint {
            Endpoint::Upload => (StatusCode::BAD_REQUEST, UPLOAD_MISSING_EMAIL_MESSAGE),
            Endpoint::List => (StatusCode::BAD_REQUEST, LIST_MISSING_EMAIL_MESSAGE),
        },
        GatewayError::InvalidForm(reason) => {
            warn!(%reason, "Malformed upload form");
            (StatusCode::BAD_REQUEST, MALFORMED_FORM_MESSAGE)
        }
        GatewayError::Staging(e) => {
            error!(%e, "Failed to stage upload");
            (StatusCode::INTERNAL_SERVER_ERROR, STAGING_FAILED_MESSAGE)
        }
        GatewayError::Upstream(_) => match endpoint {
            Endpoint::Upload => (StatusCode::BAD_GATEWAY, UPLOAD_UNAVAILABLE_MESSAGE),
            Endpoint::List => (StatusCode::BAD_GATEWAY, LIST_UNAVAILABLE_MESSAGE),
        },
    };

    (status, Json(MessageResponse::new(message))).into_response()
}
