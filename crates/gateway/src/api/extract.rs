//! Body extractor accepting either JSON or an urlencoded form

use axum::async_trait;
use axum::extract::{FromRequest, Request};
use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::{Form, Json};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::models::{MessageResponse, MALFORMED_BODY_MESSAGE};

/// Deserializes the body as `application/x-www-form-urlencoded` when the
/// request says so, and as JSON otherwise.
///
/// Any failure is answered with `400 {"message": "Malformed request body"}`.
#[derive(Debug, Clone)]
pub struct JsonOrForm<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for JsonOrForm<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<MessageResponse>);

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_form = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"));

        let value = if is_form {
            Form::<T>::from_request(req, state)
                .await
                .map(|Form(value)| value)
                .map_err(|e| malformed(e.body_text()))?
        } else {
            Json::<T>::from_request(req, state)
                .await
                .map(|Json(value)| value)
                .map_err(|e| malformed(e.body_text()))?
        };

        Ok(Self(value))
    }
}

fn malformed(reason: String) -> (StatusCode, Json<MessageResponse>) {
    debug!(%reason, "Rejected request body");
    (
        StatusCode::BAD_REQUEST,
        Json(MessageResponse::new(MALFORMED_BODY_MESSAGE)),
    )
}
