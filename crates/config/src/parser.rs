use crate::*;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, info, instrument};

/// Read a YAML config file, substituting environment variables first
#[instrument(skip(path))]
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<GatewayConfig> {
    let path = path.as_ref();
    info!(?path, "Loading configuration");

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    debug!(bytes = content.len(), "Config file read");

    let substituted = substitution::substitute_env_vars(&content)?;

    let config: GatewayConfig = serde_yaml::from_str(&substituted)
        .with_context(|| format!("Failed to parse YAML configuration: {:?}", path))?;

    info!("Configuration loaded successfully");
    Ok(config)
}

/// Load `path` if given, otherwise start from the built-in defaults
pub fn load_or_default<P: AsRef<Path>>(path: Option<P>) -> Result<GatewayConfig> {
    match path {
        Some(path) => load_config(path),
        None => {
            info!("No config file given, using defaults");
            Ok(GatewayConfig::default())
        }
    }
}

#[instrument]
pub fn generate_default_config() -> GatewayConfig {
    GatewayConfig::default()
}

#[instrument(skip(config))]
pub fn save_config<P: AsRef<Path> + std::fmt::Debug>(config: &GatewayConfig, path: P) -> Result<()> {
    let path = path.as_ref();
    info!(?path, "Saving configuration");

    let yaml = serde_yaml::to_string(config)
        .with_context(|| "Failed to serialize configuration to YAML")?;

    fs::write(path, yaml)
        .with_context(|| format!("Failed to write config file: {:?}", path))?;

    info!("Configuration saved successfully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docgate.yaml");

        let mut config = generate_default_config();
        config.upstream.timeout_secs = 12;
        config.metrics.port = Some(9100);
        save_config(&config, &path).unwrap();

        assert_eq!(load_config(&path).unwrap(), config);
    }

    #[test]
    fn test_load_substitutes_env() {
        std::env::set_var("DOCGATE_TEST_PARSER_UPSTREAM", "http://auth.internal:5000");
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docgate.yaml");
        fs::write(
            &path,
            "upstream:\n  base_url: \"${DOCGATE_TEST_PARSER_UPSTREAM}\"\nuploads:\n  staging_dir: /srv/uploads\n",
        )
        .unwrap();

        let config = load_config(&path).unwrap();

        assert_eq!(config.upstream.base_url, "http://auth.internal:5000");
        assert_eq!(config.uploads.staging_dir, PathBuf::from("/srv/uploads"));
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_config("/nonexistent/docgate.yaml").unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_load_invalid_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.yaml");
        fs::write(&path, "server:\n  port: not-a-number\n").unwrap();

        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse YAML configuration"));
    }

    #[test]
    fn test_load_or_default_without_path() {
        let config = load_or_default(None::<&Path>).unwrap();
        assert_eq!(config, GatewayConfig::default());
    }
}
