//! Axum route definitions for the gateway API.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use server::health::simple_health_handler;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::api::handlers;
use crate::service::Gateway;

/// Create all gateway routes.
///
/// # Routes
///
/// - `POST /login` - Forward credentials, redirect to the dashboard on success
/// - `POST /signup` - Forward a registration
/// - `POST /upload-document` - Stage and forward a multipart upload
/// - `POST /list-documents` - Forward a listing request
/// - `GET /health` - Liveness probe
///
/// `max_upload_bytes` caps every inbound request body.
pub fn gateway_routes(gateway: Arc<Gateway>, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/login", post(handlers::login))
        .route("/signup", post(handlers::signup))
        .route("/upload-document", post(handlers::upload_document))
        .route("/list-documents", post(handlers::list_documents))
        .route("/health", get(simple_health_handler))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(gateway)
}
