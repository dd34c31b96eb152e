//! docgate CLI and server binary
//!
//! Entry point for the gateway: start it, validate a configuration file, or
//! write a default one.

use anyhow::{Context, Result};
use cli::{Cli, Commands};
use config::{
    generate_default_config, load_config, load_or_default, save_config, validate_config,
    ConfigOverrides, GatewayConfig, ValidationReport,
};
use gateway::{api, Gateway, HttpUpstream, StagingArea};
use observability::{init_logging, LogFormat};
use server::{validate_port_available, HttpServer, ServerConfig, ServerExt};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    let format = LogFormat::parse(cli.log_format.as_str()).unwrap_or_default();
    init_logging("docgate", format)?;
    debug!(?cli, "CLI arguments parsed");

    match cli.command {
        Commands::Start {
            config,
            host,
            port,
            upstream_url,
            upstream_timeout,
            staging_dir,
            max_upload_bytes,
            metrics_port,
        } => {
            info!("Executing 'start' command");
            let overrides = ConfigOverrides {
                host,
                port,
                upstream_url: cli::resolve_upstream_url(upstream_url),
                upstream_timeout_secs: upstream_timeout,
                staging_dir,
                max_upload_bytes,
                metrics_port,
            };
            start_gateway(config.as_deref(), overrides).await
        }
        Commands::Validate { config } => {
            info!("Executing 'validate' command");
            validate_command(&config)
        }
        Commands::Init { output } => {
            info!("Executing 'init' command");
            init_command(&output)
        }
    }
}

async fn start_gateway(config_path: Option<&Path>, overrides: ConfigOverrides) -> Result<()> {
    let mut config = load_or_default(config_path)?;
    config.apply_overrides(overrides);

    let report = validate_config(&config);
    log_report(&report);
    if !report.is_valid() {
        anyhow::bail!("Cannot start gateway due to configuration errors");
    }

    if let Some(port) = config.metrics.port {
        observability::init_metrics(port).context("Failed to start metrics exporter")?;
    }

    let staging = StagingArea::new(&config.uploads.staging_dir);
    staging
        .prepare()
        .await
        .with_context(|| format!("Failed to create staging directory {:?}", staging.dir()))?;

    let upstream = HttpUpstream::new(&config.upstream.base_url, config.upstream.timeout())
        .context("Failed to build upstream client")?;

    info!(
        upstream = %config.upstream.base_url,
        timeout_secs = config.upstream.timeout_secs,
        staging_dir = ?config.uploads.staging_dir,
        max_upload_bytes = config.uploads.max_upload_bytes,
        "Starting gateway"
    );

    let gateway = Arc::new(Gateway::new(Arc::new(upstream), staging));
    let router = api::gateway_routes(gateway, config.uploads.max_upload_bytes);

    let server_config = ServerConfig::new(config.server.host.clone(), config.server.port);
    validate_port_available(&server_config).await?;

    HttpServer::new(server_config, router)
        .run_until_signal()
        .await?;

    info!("Gateway stopped");
    Ok(())
}

fn log_report(report: &ValidationReport) {
    for warning in &report.warnings {
        warn!(field = %warning.field, message = %warning.message, "Configuration warning");
    }
    if !report.is_valid() {
        error!(
            error_count = report.errors.len(),
            "Configuration validation failed"
        );
        for err in &report.errors {
            error!("{}", err);
        }
    }
}

fn validate_command(config_path: &Path) -> Result<()> {
    info!(path = ?config_path, "Validating configuration");

    let config = load_config(config_path)?;
    let report = validate_config(&config);

    println!("\n=== Configuration Validation Report ===\n");

    if !report.warnings.is_empty() {
        println!("Warnings ({}):", report.warnings.len());
        for warning in &report.warnings {
            println!("  [warn] [{}] {}", warning.field, warning.message);
        }
        println!();
    }

    if !report.errors.is_empty() {
        println!("Errors ({}):", report.errors.len());
        for err in &report.errors {
            println!("  [error] {}", err);
        }
        println!();
        anyhow::bail!("Configuration validation failed");
    }

    println!("[ok] Configuration is valid!");
    println!();
    print_summary(&config);

    Ok(())
}

fn print_summary(config: &GatewayConfig) {
    println!("Listen: {}:{}", config.server.host, config.server.port);
    println!(
        "Upstream: {} (timeout {}s)",
        config.upstream.base_url, config.upstream.timeout_secs
    );
    println!(
        "Staging: {:?} (max {} bytes)",
        config.uploads.staging_dir, config.uploads.max_upload_bytes
    );
    match config.metrics.port {
        Some(port) => println!("Metrics: port {}", port),
        None => println!("Metrics: disabled"),
    }
}

fn init_command(output_path: &Path) -> Result<()> {
    info!(?output_path, "Initializing new configuration file");

    let config = generate_default_config();

    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {:?}", parent))?;
    }

    save_config(&config, output_path)?;

    println!("[ok] Configuration file created successfully!");
    println!();
    println!("Location: {:?}", output_path);
    println!();
    print_summary(&config);
    println!();
    println!("Next steps:");
    println!("  1. Point upstream.base_url at the authentication/document service");
    println!(
        "  2. Run 'docgate validate --config {:?}' to check configuration",
        output_path
    );
    println!(
        "  3. Run 'docgate start --config {:?}' to start the gateway",
        output_path
    );

    Ok(())
}
