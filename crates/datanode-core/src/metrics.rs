//! Prometheus metrics for the datanode replica
//!
//! Metrics are registered lazily on first access using once_cell::Lazy.

use once_cell::sync::Lazy;
use prometheus::{
    register_int_counter, register_int_counter_vec, register_int_gauge, Encoder, IntCounter,
    IntCounterVec, IntGauge, TextEncoder,
};

/// Number of collections currently registered on this node
pub static REPLICA_COLLECTIONS: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!(
        "datanode_replica_collections",
        "Number of collections registered in the replica"
    )
    .expect("Failed to register replica collections gauge")
});

/// Number of segments currently registered on this node
pub static REPLICA_SEGMENTS: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!(
        "datanode_replica_segments",
        "Number of segments registered in the replica"
    )
    .expect("Failed to register replica segments gauge")
});

/// Rows accepted through statistics updates
pub static ROWS_INGESTED: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "datanode_replica_rows_ingested_total",
        "Total number of rows accounted through segment statistics updates"
    )
    .expect("Failed to register rows ingested counter")
});

/// Replica operations by name and outcome
pub static REPLICA_OPERATIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "datanode_replica_operations_total",
        "Total number of replica operations",
        &["operation", "status"]
    )
    .expect("Failed to register replica operations counter")
});

/// Records the outcome of a replica operation.
pub fn record_operation(operation: &str, success: bool) {
    let status = if success { "ok" } else { "error" };
    REPLICA_OPERATIONS
        .with_label_values(&[operation, status])
        .inc();
}

/// Encode every registered metric in the Prometheus text format.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_operation_counts_by_status() {
        let before_ok = REPLICA_OPERATIONS
            .with_label_values(&["metrics_test", "ok"])
            .get();
        let before_err = REPLICA_OPERATIONS
            .with_label_values(&["metrics_test", "error"])
            .get();

        record_operation("metrics_test", true);
        record_operation("metrics_test", true);
        record_operation("metrics_test", false);

        assert_eq!(
            REPLICA_OPERATIONS
                .with_label_values(&["metrics_test", "ok"])
                .get(),
            before_ok + 2
        );
        assert_eq!(
            REPLICA_OPERATIONS
                .with_label_values(&["metrics_test", "error"])
                .get(),
            before_err + 1
        );
    }

    #[test]
    fn test_gather_contains_replica_metrics() {
        REPLICA_SEGMENTS.set(3);
        ROWS_INGESTED.inc_by(0);
        record_operation("gather_test", true);

        let text = gather_metrics();
        assert!(text.contains("datanode_replica_segments"));
        assert!(text.contains("datanode_replica_operations_total"));
    }
}
