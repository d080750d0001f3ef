//! Prometheus metrics for the faucet and the purchase workflow.
//!
//! This module provides:
//! - Mint latency and outcome counters for the faucet endpoint
//! - Approval and purchase counters for the buy workflow
//! - Winnings claim counters
//! - Recorder installation for the `/metrics` endpoint

use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use tracing::debug;

// === Metric Name Constants ===

/// Mint transaction latency metric name.
pub const METRIC_MINT_LATENCY: &str = "faucet_mint_latency_ms";
/// Faucet requests counter metric name.
pub const METRIC_FAUCET_REQUESTS: &str = "faucet_requests_total";
/// Successful mints counter metric name.
pub const METRIC_MINTS: &str = "faucet_mints_total";
/// Approvals counter metric name.
pub const METRIC_APPROVALS: &str = "approvals_total";
/// Purchases counter metric name.
pub const METRIC_PURCHASES: &str = "purchases_total";
/// Winnings claims counter metric name.
pub const METRIC_WINNINGS_CLAIMS: &str = "winnings_claims_total";
/// Failed transactions counter metric name.
pub const METRIC_TRANSACTIONS_FAILED: &str = "transactions_failed_total";

/// Initialize all metric descriptions.
/// Call this once at startup to register metrics with descriptions.
pub fn init_metrics() {
    describe_histogram!(
        METRIC_MINT_LATENCY,
        "Faucet mint latency until receipt in milliseconds"
    );

    describe_counter!(
        METRIC_FAUCET_REQUESTS,
        "Total number of faucet requests by result"
    );
    describe_counter!(METRIC_MINTS, "Total number of faucet mints confirmed");
    describe_counter!(METRIC_APPROVALS, "Total number of token approvals confirmed");
    describe_counter!(METRIC_PURCHASES, "Total number of share purchases confirmed");
    describe_counter!(
        METRIC_WINNINGS_CLAIMS,
        "Total number of winnings claims confirmed"
    );
    describe_counter!(
        METRIC_TRANSACTIONS_FAILED,
        "Total number of transactions that failed, by kind"
    );

    debug!("Metrics initialized");
}

/// Install the global Prometheus recorder and describe every metric.
pub fn install_recorder() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    init_metrics();
    Ok(handle)
}

/// Count a faucet request by result (`ok`, `invalid`, `error`).
pub fn inc_faucet_requests(result: &'static str) {
    counter!(METRIC_FAUCET_REQUESTS, "result" => result).increment(1);
}

/// Increment mints counter.
pub fn inc_mints() {
    counter!(METRIC_MINTS).increment(1);
}

/// Increment approvals counter.
pub fn inc_approvals() {
    counter!(METRIC_APPROVALS).increment(1);
}

/// Increment purchases counter.
pub fn inc_purchases() {
    counter!(METRIC_PURCHASES).increment(1);
}

/// Increment winnings claims counter.
pub fn inc_winnings_claims() {
    counter!(METRIC_WINNINGS_CLAIMS).increment(1);
}

/// Increment failed transactions counter.
pub fn inc_transactions_failed(kind: &'static str) {
    counter!(METRIC_TRANSACTIONS_FAILED, "kind" => kind).increment(1);
}

/// RAII guard for timing operations.
/// Automatically records latency when dropped.
pub struct LatencyTimer {
    start: Instant,
    metric_name: &'static str,
}

impl LatencyTimer {
    /// Create a new latency timer for the given metric.
    pub fn new(metric_name: &'static str) -> Self {
        Self {
            start: Instant::now(),
            metric_name,
        }
    }

    /// Get elapsed time in milliseconds (without recording).
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

impl Drop for LatencyTimer {
    fn drop(&mut self) {
        histogram!(self.metric_name).record(self.elapsed_ms());
    }
}

/// Create a latency timer for faucet mints.
pub fn timer_mint() -> LatencyTimer {
    LatencyTimer::new(METRIC_MINT_LATENCY)
}
