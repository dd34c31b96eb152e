//! HTTP API for the gateway.
//!
//! ## Modules
//!
//! - `handlers` - Axum handlers translating gateway results into responses
//! - `routes` - Router wiring, body limit and request tracing
//! - `extract` - JSON-or-form body extractor for login/signup
//! - `models` - Response types

pub mod extract;
pub mod handlers;
pub mod models;
pub mod routes;

pub use routes::gateway_routes;
