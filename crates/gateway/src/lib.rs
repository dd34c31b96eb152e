//! docgate forwarding gateway
//!
//! Sits between browser clients and the upstream authentication/document
//! service:
//! - Login and signup are forwarded and turned into a redirect (plus an
//!   optional notice) based on the upstream's success marker
//! - Document uploads are staged to disk, streamed upstream, then deleted
//! - Document listings are passed through unchanged
//!
//! The gateway holds no state beyond its configuration. The upstream is
//! reached through the [`Upstream`] trait; [`HttpUpstream`] is the reqwest
//! implementation used in production.
//!
//! # Example
//!
//! ```ignore
//! use gateway::{api, Gateway, HttpUpstream, StagingArea};
//! use std::{sync::Arc, time::Duration};
//!
//! let upstream = HttpUpstream::new("http://localhost:5000", Duration::from_secs(30))?;
//! let gateway = Arc::new(Gateway::new(Arc::new(upstream), StagingArea::new("uploads")));
//! let router = api::gateway_routes(gateway, 16 * 1024 * 1024);
//! ```

pub mod api;
pub mod error;
pub mod service;
pub mod staging;
pub mod types;
pub mod upstream;

#[cfg(test)]
mod testing;

pub use error::{GatewayError, Result, UpstreamError};
pub use service::Gateway;
pub use staging::{StagedUpload, StagingArea};
pub use types::{Credentials, DocumentList, DocumentOwner, Outcome, Registration, UpstreamReply};
pub use upstream::{HttpUpstream, Upstream, UpstreamResult};
