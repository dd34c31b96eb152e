//! API response models.

use serde::{Deserialize, Serialize};

/// JSON error body returned to clients, `{"message": "..."}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

pub const MALFORMED_BODY_MESSAGE: &str = "Malformed request body";
pub const MALFORMED_FORM_MESSAGE: &str = "Malformed upload form";
pub const MISSING_FILE_MESSAGE: &str = "No file uploaded";
pub const UPLOAD_MISSING_EMAIL_MESSAGE: &str = "No email provided";
pub const LIST_MISSING_EMAIL_MESSAGE: &str = "Email is required";
pub const STAGING_FAILED_MESSAGE: &str = "Failed to stage upload";
pub const UPLOAD_UNAVAILABLE_MESSAGE: &str = "Failed to upload document. Please try again later.";
pub const LIST_UNAVAILABLE_MESSAGE: &str = "Failed to list documents. Please try again later.";
