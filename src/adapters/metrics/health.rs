//! Health Check Server - Liveness, Readiness, and Metrics Export
//!
//! Exposes /live, /ready, and /metrics via axum 0.7 for Docker health
//! checks and Prometheus scraping. Readiness requires every configured
//! network's node to answer and the gateway to still be accepting
//! traffic.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use tokio::sync::broadcast;
use tracing::{info, instrument};

use crate::adapters::metrics::MetricsRegistry;
use crate::usecases::gateway::GatewayRouter;

/// Shared health state polled by readiness probes.
pub struct HealthState {
    /// Cleared at shutdown so orchestrators drain traffic first.
    accepting: AtomicBool,
    router: Arc<GatewayRouter>,
    metrics: Arc<MetricsRegistry>,
}

impl HealthState {
    pub fn new(router: Arc<GatewayRouter>, metrics: Arc<MetricsRegistry>) -> Self {
        Self { accepting: AtomicBool::new(true), router, metrics }
    }

    /// Flip readiness to 503 ahead of process exit.
    pub fn stop_accepting(&self) {
        self.accepting.store(false, Ordering::Relaxed);
    }

    /// Ready when still accepting and every node answers. Each probe
    /// refreshes the per-network reachability gauges as a side effect.
    pub async fn is_ready(&self) -> bool {
        let health = self.router.health_by_network().await;
        let mut all_up = true;
        for (network, up) in health {
            self.metrics
                .node_up
                .with_label_values(&[&network.to_string()])
                .set(i64::from(up));
            all_up &= up;
        }
        self.accepting.load(Ordering::Relaxed) && all_up
    }
}

/// Axum-based observability HTTP server.
pub struct HealthServer {
    state: Arc<HealthState>,
    metrics: Arc<MetricsRegistry>,
    bind_address: String,
}

impl HealthServer {
    pub fn new(
        state: Arc<HealthState>,
        metrics: Arc<MetricsRegistry>,
        bind_address: String,
    ) -> Self {
        Self { state, metrics, bind_address }
    }

    /// Run the observability server until shutdown.
    #[instrument(skip(self, shutdown_rx))]
    pub async fn run(
        self,
        mut shutdown_rx: broadcast::Receiver<()>,
    ) -> anyhow::Result<()> {
        let metrics = Arc::clone(&self.metrics);
        let app = Router::new()
            .route("/live", get(Self::liveness))
            .route("/ready", get(Self::readiness))
            .route("/metrics", get(move || async move { metrics.render() }))
            .with_state(Arc::clone(&self.state));

        let listener = tokio::net::TcpListener::bind(&self.bind_address).await?;
        info!(address = %self.bind_address, "Health server started");

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
            })
            .await?;

        Ok(())
    }

    /// Liveness probe: always returns 200 if the process is running.
    async fn liveness() -> impl IntoResponse {
        (StatusCode::OK, "OK")
    }

    /// Readiness probe: 200 only while accepting and all nodes answer.
    async fn readiness(State(state): State<Arc<HealthState>>) -> impl IntoResponse {
        if state.is_ready().await {
            (StatusCode::OK, "READY")
        } else {
            (StatusCode::SERVICE_UNAVAILABLE, "NOT READY")
        }
    }
}
