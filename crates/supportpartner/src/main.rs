//! SupportPartner - dual-store data router and API server

use anyhow::{Context, Result};
use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod config;

use crate::config::{Config, LoggingConfig};
use partner_api::{AppState, create_router};
use partner_auth::Authenticator;
use partner_core::{DataRouter, SupportPartnerApi, spawn_health_task};
use partner_db::RelationalStore;
use partner_hosted::{HostedClient, HostedClientConfig};
use partner_store::Store;

/// Seconds between Prometheus histogram upkeep runs
const METRICS_UPKEEP_SECS: u64 = 5;

/// SupportPartner - routes sensitive partner data to a dedicated Postgres store
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml")]
    config: String,

    /// Bind address
    #[arg(long, env = "SUPPORTPARTNER_BIND")]
    bind: Option<String>,

    /// Port
    #[arg(short, long, env = "SUPPORTPARTNER_PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Load configuration
    let config = Config::load(&args.config)?;

    // Initialize logging
    init_logging(&config.logging);

    info!("Starting SupportPartner v{}", env!("CARGO_PKG_VERSION"));

    // Install the metrics recorder before anything records
    let metrics_handle = PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install Prometheus recorder")?;
    let upkeep_handle = metrics_handle.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(METRICS_UPKEEP_SECS));
        loop {
            interval.tick().await;
            upkeep_handle.run_upkeep();
        }
    });

    // Hosted store
    let hosted: Arc<dyn Store> = Arc::new(HostedClient::new(HostedClientConfig {
        url: config.hosted.url.clone(),
        api_key: config.hosted.anon_key.clone(),
        health_table: config.hosted.health_table.clone(),
        timeout: config.hosted.timeout(),
    })?);

    // Relational store, when configured
    let relational: Option<Arc<dyn Store>> = if config.relational.is_configured() {
        let store = RelationalStore::connect_lazy(&config.relational)?;
        Some(Arc::new(store))
    } else {
        warn!("Relational store not configured; sensitive tables will use the hosted store");
        None
    };

    // Router and initial health check
    let router = Arc::new(DataRouter::new(hosted, relational, config.router.clone()));
    let health = router.health_check().await;
    info!(
        "Initial store health: hosted={}, relational={}",
        health.hosted, health.relational
    );
    let health_task = spawn_health_task(router.clone(), config.router.health_interval());

    // Authentication
    let auth = if config.auth.enabled {
        Authenticator::verify(&config.auth.jwt_secret, config.auth.audience())
    } else {
        Authenticator::trust()
    };

    // Create application state
    let state = AppState::new(SupportPartnerApi::new(router.clone()), Arc::new(auth));

    // Create router
    let app = create_router(state, Some(Arc::new(metrics_handle))).layer(TraceLayer::new_for_http());

    // Determine bind address
    let bind_addr = args.bind.unwrap_or(config.server.bind_address);
    let port = args.port.unwrap_or(config.server.port);
    let addr: SocketAddr = format!("{}:{}", bind_addr, port).parse()?;

    info!("Listening on {}", addr);
    info!("Hosted store: {}", config.hosted.url);
    if config.relational.is_configured() {
        info!("Relational store: {}", config.relational.display_target());
    }

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Stop probing, then release the pools
    health_task.abort();
    router.close().await;

    info!("Server stopped");
    Ok(())
}

/// Initialize logging
///
/// `RUST_LOG` wins over the configured level.
fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let registry = tracing_subscriber::registry().with(filter);
    if config.format == "json" {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

/// Wait for CTRL+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install CTRL+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}
