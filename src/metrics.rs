//! Prometheus metrics for CEP lookups and record writes.
//!
//! Recording is a no-op until [`install_recorder`] runs, so library code and
//! tests can call these helpers unconditionally.

use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use tracing::debug;

use crate::store::RecordKind;

// === Metric Name Constants ===

/// CEP lookup latency metric name.
pub const METRIC_LOOKUP_LATENCY: &str = "cep_lookup_latency_ms";
/// CEP lookups counter metric name, labelled by outcome.
pub const METRIC_LOOKUPS: &str = "cep_lookups_total";
/// Record writes counter metric name, labelled by kind and operation.
pub const METRIC_RECORD_WRITES: &str = "record_writes_total";

/// Initialize all metric descriptions.
pub fn init_metrics() {
    describe_histogram!(
        METRIC_LOOKUP_LATENCY,
        "Round trip to the CEP provider in milliseconds"
    );
    describe_counter!(
        METRIC_LOOKUPS,
        "Total number of CEP lookups by outcome (resolved, not_found, error)"
    );
    describe_counter!(
        METRIC_RECORD_WRITES,
        "Total number of committed record writes by kind and operation"
    );

    debug!("Metrics initialized");
}

/// Install the global Prometheus recorder and describe every metric.
pub fn install_recorder() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    init_metrics();
    Ok(handle)
}

/// Record CEP lookup latency.
pub fn record_lookup_latency(start: Instant) {
    let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
    histogram!(METRIC_LOOKUP_LATENCY).record(latency_ms);
}

/// Count a lookup by outcome.
pub fn inc_lookups(outcome: &'static str) {
    counter!(METRIC_LOOKUPS, "outcome" => outcome).increment(1);
}

/// Count a committed write.
pub fn inc_record_writes(kind: RecordKind, operation: &'static str) {
    counter!(METRIC_RECORD_WRITES, "kind" => kind.table(), "operation" => operation).increment(1);
}
