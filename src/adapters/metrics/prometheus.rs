//! Prometheus Metrics Registry - Gateway Observability
//!
//! Registers and exposes Prometheus metrics for Grafana dashboards.
//! Covers per-network request counts, error taxonomy counts, node call
//! latency, confirmation outcomes, and batch item outcomes.

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGaugeVec, Opts,
    Registry, TextEncoder,
};

use crate::domain::error::GatewayError;
use crate::domain::network::NetworkId;
use crate::domain::transfer::TransactionStatus;

/// Centralized Prometheus metrics for the gateway.
///
/// All metrics follow the naming convention `chain_gateway_*` and carry
/// a `network` label for per-chain filtering.
pub struct MetricsRegistry {
    /// Prometheus registry.
    registry: Registry,
    /// Requests served, by network and operation.
    pub requests: IntCounterVec,
    /// Failed requests, by network and taxonomy kind.
    pub errors: IntCounterVec,
    /// End-to-end request latency in seconds, by network and operation.
    pub request_latency: HistogramVec,
    /// Terminal confirmation outcomes, by network and status.
    pub confirmations: IntCounterVec,
    /// Predicate checks consumed per confirmation watch.
    pub poll_attempts: HistogramVec,
    /// Batch item outcomes, by network and outcome.
    pub batch_items: IntCounterVec,
    /// Node reachability (1 = answering, 0 = down), by network.
    pub node_up: IntGaugeVec,
}

impl MetricsRegistry {
    /// Create and register all Prometheus metrics.
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let requests = IntCounterVec::new(
            Opts::new("chain_gateway_requests_total", "Total gateway requests"),
            &["network", "operation"],
        )?;

        let errors = IntCounterVec::new(
            Opts::new(
                "chain_gateway_errors_total",
                "Total failed requests by error kind",
            ),
            &["network", "kind"],
        )?;

        let request_latency = HistogramVec::new(
            HistogramOpts::new(
                "chain_gateway_request_latency_seconds",
                "End-to-end request latency in seconds",
            )
            .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 15.0, 30.0, 60.0]),
            &["network", "operation"],
        )?;

        let confirmations = IntCounterVec::new(
            Opts::new(
                "chain_gateway_confirmations_total",
                "Terminal confirmation outcomes",
            ),
            &["network", "status"],
        )?;

        let poll_attempts = HistogramVec::new(
            HistogramOpts::new(
                "chain_gateway_poll_attempts",
                "Predicate checks consumed per confirmation watch",
            )
            .buckets(vec![1.0, 2.0, 3.0, 5.0, 7.0, 10.0]),
            &["network"],
        )?;

        let batch_items = IntCounterVec::new(
            Opts::new("chain_gateway_batch_items_total", "Batch item outcomes"),
            &["network", "outcome"],
        )?;

        let node_up = IntGaugeVec::new(
            Opts::new(
                "chain_gateway_node_up",
                "Node reachability (1=answering, 0=down)",
            ),
            &["network"],
        )?;

        // Register all metrics
        registry.register(Box::new(requests.clone()))?;
        registry.register(Box::new(errors.clone()))?;
        registry.register(Box::new(request_latency.clone()))?;
        registry.register(Box::new(confirmations.clone()))?;
        registry.register(Box::new(poll_attempts.clone()))?;
        registry.register(Box::new(batch_items.clone()))?;
        registry.register(Box::new(node_up.clone()))?;

        Ok(Self {
            registry,
            requests,
            errors,
            request_latency,
            confirmations,
            poll_attempts,
            batch_items,
            node_up,
        })
    }

    /// Count one served request.
    pub fn record_request(&self, network: NetworkId, operation: &str) {
        self.requests
            .with_label_values(&[&network.to_string(), operation])
            .inc();
    }

    /// Count one failed request under its taxonomy kind.
    pub fn record_error(&self, error: &GatewayError) {
        self.errors
            .with_label_values(&[&error.network().to_string(), error.kind()])
            .inc();
    }

    /// Observe end-to-end latency for one request.
    pub fn observe_latency(&self, network: NetworkId, operation: &str, seconds: f64) {
        self.request_latency
            .with_label_values(&[&network.to_string(), operation])
            .observe(seconds);
    }

    /// Count one terminal confirmation outcome.
    pub fn record_confirmation(&self, network: NetworkId, status: TransactionStatus) {
        let label = match status {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Confirmed => "confirmed",
            TransactionStatus::TimedOut => "timed_out",
            TransactionStatus::Failed => "failed",
        };
        self.confirmations
            .with_label_values(&[&network.to_string(), label])
            .inc();
    }

    /// Observe how many predicate checks one confirmation watch consumed.
    pub fn observe_poll_attempts(&self, network: NetworkId, attempts: u32) {
        self.poll_attempts
            .with_label_values(&[&network.to_string()])
            .observe(f64::from(attempts));
    }

    /// Count one batch item outcome.
    pub fn record_batch_item(&self, network: NetworkId, outcome: &str) {
        self.batch_items
            .with_label_values(&[&network.to_string(), outcome])
            .inc();
    }

    /// Render the registry in the Prometheus text exposition format.
    pub fn render(&self) -> String {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        if encoder.encode(&metric_families, &mut buffer).is_err() {
            return String::new();
        }
        String::from_utf8(buffer).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_registers_without_collision() {
        let metrics = MetricsRegistry::new().unwrap();
        metrics.record_request(NetworkId::Solana, "send");
        metrics.record_error(&GatewayError::not_found(NetworkId::Solana, "missing"));
        metrics.record_confirmation(NetworkId::Solana, TransactionStatus::Confirmed);
        metrics.record_batch_item(NetworkId::Solana, "sent");

        let families = metrics.registry.gather();
        assert!(families.len() >= 4);
    }

    #[test]
    fn test_poll_attempts_histogram_counts_observations() {
        let metrics = MetricsRegistry::new().unwrap();
        metrics.observe_poll_attempts(NetworkId::Tezos, 3);
        metrics.observe_poll_attempts(NetworkId::Tezos, 10);

        let histogram = metrics
            .poll_attempts
            .with_label_values(&["tezos"]);
        assert_eq!(histogram.get_sample_count(), 2);
        assert_eq!(histogram.get_sample_sum(), 13.0);
    }
}
