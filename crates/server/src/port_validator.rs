//! Port validation utilities
//!
//! Checking a port before binding is racy: another process can take it in
//! between. These checks give early, readable feedback at startup; the bind
//! itself remains the source of truth.

use tokio::net::TcpListener;
use tracing::{debug, error};

use crate::config::ServerConfig;
use crate::error::{Result, ServerError};

/// Check that the configured port can be bound right now
pub async fn validate_port_available(config: &ServerConfig) -> Result<()> {
    let addr = config.address();
    debug!(%addr, "Checking HTTP port");

    match TcpListener::bind((config.host.as_str(), config.port)).await {
        Ok(listener) => {
            let local_addr = listener.local_addr()?;
            drop(listener);
            debug!(%local_addr, "HTTP port is available");
            Ok(())
        }
        Err(e) => {
            error!(%addr, %e, "HTTP port is NOT available");
            Err(ServerError::port_in_use(config.port, e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_validate_port_available() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let config = ServerConfig::new("127.0.0.1", port);

        let err = validate_port_available(&config).await.unwrap_err();
        assert!(matches!(err, ServerError::PortInUse { port: p, .. } if p == port));

        drop(listener);
        assert!(validate_port_available(&config).await.is_ok());
    }
}
