//! Line Monitor - PharmaMind production line monitoring daemon
//!
//! Polls the manufacturing backend for the selected production line,
//! derives OEE, maintenance, quality and analytics views, and serves
//! them alongside health and Prometheus endpoints.

use anyhow::Result;
use monitor_lib::{
    health::HealthRegistry,
    observability::{MonitorMetrics, StructuredLogger},
    GatewayClient, GatewayConfig, Monitor, MonitorOptions, ViewContext,
};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod api;
mod config;

const MONITOR_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!("Starting line-monitor");

    let config = config::MonitorConfig::load()?;
    info!(
        instance = %config.instance_name,
        api_endpoint = %config.api_endpoint,
        "Monitor configured"
    );

    let client = GatewayClient::new(
        GatewayConfig::new(config.api_endpoint.clone()).with_timeout(config.request_timeout()),
    )?;

    let health_registry = HealthRegistry::new();
    let metrics = MonitorMetrics::new();

    let logger = StructuredLogger::new(&config.instance_name);
    logger.log_startup(MONITOR_VERSION, &config.api_endpoint);

    let options = MonitorOptions {
        batch_limit: config.batch_limit,
        analytics_range: config.analytics_range(),
        initial_line: config.initial_line,
        noise_seed: config.noise_seed,
        line_list_refresh: config.line_list_refresh(),
    };
    let ctx = ViewContext {
        health: health_registry.clone(),
        metrics,
        logger: logger.clone(),
    };
    let monitor = Arc::new(Monitor::new(Arc::new(client), options, ctx));

    // Readiness flips once the line list arrives; the poller keeps retrying
    if let Err(e) = monitor.refresh_lines().await {
        warn!(error = %e, "Initial production line list fetch failed");
    }

    let (shutdown_tx, _) = broadcast::channel(1);
    let pollers = monitor.start(&shutdown_tx).await;
    info!(pollers = pollers.len(), "Pollers started");

    let app_state = Arc::new(api::AppState::new(health_registry, monitor.clone()));
    let api_handle = tokio::spawn(api::serve(config.api_port, app_state));

    // Wait for shutdown signal
    tokio::signal::ctrl_c().await?;
    logger.log_shutdown("SIGINT received");
    info!("Shutting down");

    let _ = shutdown_tx.send(());
    for poller in pollers {
        poller.stop();
    }
    api_handle.abort();

    Ok(())
}
