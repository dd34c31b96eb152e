//! Server infrastructure for docgate
//!
//! Binds the gateway's Axum router to a TCP listener and runs it until a
//! shutdown signal arrives, draining in-flight requests first.
//!
//! # Architecture
//!
//! [`HttpServer`] implements the [`Server`] trait. The [`ServerExt`] trait
//! adds `spawn()` and `run_until_signal()`.
//!
//! Shutdown coordination uses `CancellationToken` from `tokio_util`.
//!
//! # Quick Start
//!
//! ```ignore
//! use server::{HttpServer, ServerConfig, ServerExt};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let server = HttpServer::new(ServerConfig::new("0.0.0.0", 3000), router);
//!     server.run_until_signal().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! - [`config`] - Listener address
//! - [`traits`] - `Server` and `ServerExt` traits
//! - [`http`] - HTTP server using Axum
//! - [`health`] - Health check handler
//! - [`port_validator`] - Startup port checks
//! - [`shutdown`] - Graceful shutdown utilities

pub mod config;
pub mod error;
pub mod health;
pub mod http;
pub mod port_validator;
pub mod shutdown;
pub mod traits;

pub use config::ServerConfig;
pub use error::{Result, ServerError};
pub use http::HttpServer;
pub use port_validator::validate_port_available;
pub use shutdown::ShutdownController;
pub use traits::{Server, ServerExt};
