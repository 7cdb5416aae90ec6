//! Multichain Gateway — Entry Point
//!
//! Initializes configuration, logging, chain adapters, and the HTTP
//! surface. Runs until SIGINT/SIGTERM.
//!
//! Wiring sequence:
//! 1. Load config.toml + validate
//! 2. Init tracing (JSON structured logging)
//! 3. Shutdown broadcast channel (also cancels in-flight confirmation polls)
//! 4. Build one adapter per enabled network (node clients + pools)
//! 5. Assemble GatewayRouter (dispatch + poller + per-sender ordering)
//! 6. Assemble BatchOrchestrator over the router
//! 7. Spawn observability server (/live + /ready + /metrics)
//! 8. Serve the gateway API
//! 9. Wait for SIGINT → graceful shutdown (drain→cancel polls→exit)

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tokio::sync::broadcast;
use tracing::{info, warn};

use multichain_gateway::adapters::chains::build_adapters;
use multichain_gateway::adapters::http::{self, AppState};
use multichain_gateway::adapters::metrics::{HealthServer, HealthState, MetricsRegistry};
use multichain_gateway::config;
use multichain_gateway::usecases::batch::BatchOrchestrator;
use multichain_gateway::usecases::gateway::GatewayRouter;

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1. Load configuration from config.toml ──────────────
    let config = config::loader::load_config("config.toml")
        .context("Failed to load configuration")?;

    // ── 2. Initialize structured JSON logging ───────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    tracing_subscriber::EnvFilter::new(&config.gateway.log_level)
                }),
        )
        .json()
        .init();

    info!(
        name = %config.gateway.name,
        version = env!("CARGO_PKG_VERSION"),
        networks = config.networks.len(),
        "Starting multichain gateway"
    );

    // ── 3. Shutdown signal channel ──────────────────────────
    let (shutdown_tx, _shutdown_rx) = broadcast::channel::<()>(1);

    // ── 4. Build chain adapters from config ─────────────────
    let adapters = build_adapters(&config).context("Failed to build chain adapters")?;

    // ── 5. Assemble the gateway router ──────────────────────
    let gateway = Arc::new(GatewayRouter::new(
        adapters,
        config.poller.to_policy(),
        shutdown_tx.clone(),
    ));

    // ── 6. Assemble the batch orchestrator ──────────────────
    let batch = Arc::new(BatchOrchestrator::new(Arc::clone(&gateway), config.batch));

    // ── 7. Spawn observability server ───────────────────────
    let metrics = Arc::new(MetricsRegistry::new().context("Failed to build metrics")?);
    let health_state =
        Arc::new(HealthState::new(Arc::clone(&gateway), Arc::clone(&metrics)));
    let health_handle = if config.metrics.enabled {
        let server = HealthServer::new(
            Arc::clone(&health_state),
            Arc::clone(&metrics),
            config.metrics.bind_address.clone(),
        );
        let shutdown = shutdown_tx.subscribe();
        Some(tokio::spawn(async move {
            if let Err(e) = server.run(shutdown).await {
                warn!(error = %e, "Observability server failed");
            }
        }))
    } else {
        None
    };

    // ── 8. Serve the gateway API ────────────────────────────
    let state = AppState {
        gateway: Arc::clone(&gateway),
        batch,
        metrics,
    };
    let app = http::router(state);
    let listener = tokio::net::TcpListener::bind(&config.gateway.bind_address)
        .await
        .with_context(|| {
            format!("Failed to bind gateway API on {}", config.gateway.bind_address)
        })?;
    info!(address = %config.gateway.bind_address, "Gateway API listening");

    let api_shutdown = shutdown_tx.subscribe();
    let api_handle = tokio::spawn(async move {
        let mut shutdown = api_shutdown;
        let result = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await;
        if let Err(e) = result {
            warn!(error = %e, "Gateway API server failed");
        }
    });

    // ── 9. Wait for SIGINT or SIGTERM ───────────────────────
    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("SIGINT received, initiating graceful shutdown");
        }
    }

    // ── Graceful shutdown (drain → cancel polls → exit) ─────

    // 1. Flip readiness to 503 so orchestrators drain traffic
    health_state.stop_accepting();

    // 2. Broadcast shutdown: stops the servers and cancels every
    //    in-flight confirmation poll
    let _ = shutdown_tx.send(());
    info!("Shutdown signal broadcast to all tasks");

    // 3. Wait for the API server to drain (up to 30s)
    let _ = tokio::time::timeout(
        std::time::Duration::from_secs(30),
        api_handle,
    )
    .await;

    // 4. Wait for the observability server (up to 5s)
    if let Some(handle) = health_handle {
        let _ = tokio::time::timeout(
            std::time::Duration::from_secs(5),
            handle,
        )
        .await;
    }

    info!("Shutdown complete");
    Ok(())
}
