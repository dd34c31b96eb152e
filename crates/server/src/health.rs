//! Health check endpoint

use axum::response::Json;
use chrono::Utc;
use serde_json::{json, Value};

/// `GET /health` handler: `{"status": "ok", "timestamp": <RFC 3339>}`
pub async fn simple_health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}
