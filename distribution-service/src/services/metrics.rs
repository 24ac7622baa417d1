//! Metrics module for distribution-service.
//! Prometheus metrics for the daily-operation lifecycle and the recorders.

use once_cell::sync::Lazy;
use prometheus::{
    histogram_opts, opts, register_histogram_vec, register_int_counter, register_int_counter_vec,
    Encoder, HistogramVec, IntCounter, IntCounterVec, TextEncoder,
};
use std::sync::OnceLock;

/// Database query duration histogram
pub static DB_QUERY_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        histogram_opts!(
            "distribution_db_query_duration_seconds",
            "Database query duration"
        ),
        &["operation"]
    )
    .expect("Failed to register DB_QUERY_DURATION")
});

/// Operation lifecycle events (started, closed)
pub static OPERATION_EVENTS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();

/// Recorded transactions by kind (purchase, sale, loss, cost)
pub static TRANSACTIONS_RECORDED_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();

/// Standalone debt payments by entity kind (farm, buyer)
pub static DEBT_PAYMENTS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();

/// Consistency warnings emitted by the close-time reconciliation check. A
/// plain counter; the offending operation id lives in the log event, not in
/// a label, so the series count stays bounded.
pub static RECONCILIATION_WARNINGS_TOTAL: OnceLock<IntCounter> = OnceLock::new();

/// Initialize all metrics. Call once at startup.
pub fn init_metrics() {
    OPERATION_EVENTS_TOTAL.get_or_init(|| {
        register_int_counter_vec!(
            opts!(
                "distribution_operation_events_total",
                "Daily operation lifecycle events"
            ),
            &["event"]
        )
        .expect("Failed to register OPERATION_EVENTS_TOTAL")
    });

    TRANSACTIONS_RECORDED_TOTAL.get_or_init(|| {
        register_int_counter_vec!(
            opts!(
                "distribution_transactions_recorded_total",
                "Recorded operation entries by kind"
            ),
            &["kind"]
        )
        .expect("Failed to register TRANSACTIONS_RECORDED_TOTAL")
    });

    DEBT_PAYMENTS_TOTAL.get_or_init(|| {
        register_int_counter_vec!(
            opts!(
                "distribution_debt_payments_total",
                "Standalone debt payments by entity kind"
            ),
            &["entity"]
        )
        .expect("Failed to register DEBT_PAYMENTS_TOTAL")
    });

    RECONCILIATION_WARNINGS_TOTAL.get_or_init(|| {
        register_int_counter!(opts!(
            "distribution_reconciliation_warnings_total",
            "Close-time profit reconciliation mismatches"
        ))
        .expect("Failed to register RECONCILIATION_WARNINGS_TOTAL")
    });
}

/// Render all registered metrics in Prometheus text format.
pub fn get_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .expect("Failed to encode metrics");
    String::from_utf8(buffer).expect("Failed to convert metrics to string")
}

/// Record an operation lifecycle event.
pub fn record_operation_event(event: &str) {
    if let Some(counter) = OPERATION_EVENTS_TOTAL.get() {
        counter.with_label_values(&[event]).inc();
    }
}

/// Record a transaction of the given kind.
pub fn record_transaction(kind: &str) {
    if let Some(counter) = TRANSACTIONS_RECORDED_TOTAL.get() {
        counter.with_label_values(&[kind]).inc();
    }
}

/// Record a standalone debt payment.
pub fn record_debt_payment(entity: &str) {
    if let Some(counter) = DEBT_PAYMENTS_TOTAL.get() {
        counter.with_label_values(&[entity]).inc();
    }
}

/// Record a reconciliation warning.
pub fn record_reconciliation_warning() {
    if let Some(counter) = RECONCILIATION_WARNINGS_TOTAL.get() {
        counter.inc();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reconciliation_counter_has_no_per_operation_labels() {
        init_metrics();
        record_reconciliation_warning();

        let rendered = get_metrics();
        let line = rendered
            .lines()
            .find(|l| l.starts_with("distribution_reconciliation_warnings_total"))
            .expect("Counter missing from exposition");
        assert!(!line.contains("operation_id"));
    }
}
