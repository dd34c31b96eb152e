//! Request and outcome types for the forwarding gateway

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Message the upstream returns on a successful login
pub const LOGIN_SUCCESS_MARKER: &str = "Login successful";
/// Message the upstream returns on a successful registration
pub const REGISTER_SUCCESS_MARKER: &str = "Successfully registered";

pub const LOGIN_REJECTED_MESSAGE: &str = "Invalid email or password. Please try again.";
pub const LOGIN_UNAVAILABLE_MESSAGE: &str = "Login failed. Please try again later.";
pub const SIGNUP_SUCCESS_NOTICE: &str = "Registration successful! Please log in.";
pub const SIGNUP_REJECTED_MESSAGE: &str = "Registration failed. Please try again.";
pub const SIGNUP_UNAVAILABLE_MESSAGE: &str = "Registration failed. Please try again later.";

/// Login page
pub const LOGIN_PAGE: &str = "/";
/// Registration page
pub const REGISTER_PAGE: &str = "/register";
/// Dashboard page, reached after a successful login
pub const DASHBOARD_PAGE: &str = "/dashboard";

/// Login form submission
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Registration form submission
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct Registration {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl Registration {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Body of a list-documents request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentOwner {
    #[serde(default)]
    pub email: String,
}

/// Listing payload as returned by the upstream, relayed without interpretation
pub type DocumentList = Value;

/// A reply received from the upstream service
///
/// The body is kept as raw JSON. The gateway only ever looks at its
/// `message` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpstreamReply {
    pub status: u16,
    pub body: Value,
}

impl UpstreamReply {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    /// True for 2xx statuses
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The `message` string of the body, if any
    pub fn message(&self) -> Option<&str> {
        self.body.get("message").and_then(Value::as_str)
    }

    /// True when the reply is 2xx and carries exactly `marker` as its message
    pub fn has_marker(&self, marker: &str) -> bool {
        self.is_success() && self.message() == Some(marker)
    }
}

/// Client-visible result of a login or signup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Proceed to `redirect`, optionally telling the user something first
    Success {
        redirect: String,
        notice: Option<String>,
    },
    /// Show `message` and send the user back to `redirect`
    Failure { message: String, redirect: String },
}

impl Outcome {
    pub fn success(redirect: impl Into<String>) -> Self {
        Self::Success {
            redirect: redirect.into(),
            notice: None,
        }
    }

    pub fn success_with_notice(redirect: impl Into<String>, notice: impl Into<String>) -> Self {
        Self::Success {
            redirect: redirect.into(),
            notice: Some(notice.into()),
        }
    }

    pub fn failure(message: impl Into<String>, redirect: impl Into<String>) -> Self {
        Self::Failure {
            message: message.into(),
            redirect: redirect.into(),
        }
    }
}

/// Dashboard location for a logged-in user, e.g. `/dashboard?email=a%40b.com`
pub fn dashboard_redirect(email: &str) -> String {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("email", email)
        .finish();
    format!("{}?{}", DASHBOARD_PAGE, query)
}
