use axum::http::StatusCode;
use once_cell::sync::Lazy;
use prometheus::{register_int_counter_vec, register_int_gauge, Encoder, IntCounterVec, IntGauge, TextEncoder};

// Prometheus metrics (default registry)
pub static CATALOG_OPERATIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "dashboard_catalog_operations_total",
        "Catalog operations by kind and outcome",
        &["op", "outcome"]
    )
    .expect("register catalog_operations_total")
});

pub static STORE_ERRORS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "dashboard_store_errors_total",
        "Services document read/write failures",
        &["kind"]
    )
    .expect("register store_errors_total")
});

pub static SERVICES_STORED: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!(
        "dashboard_services_stored",
        "Number of services seen in the last full listing"
    )
    .expect("register services_stored")
});

pub fn record_op(op: &str, ok: bool) {
    let outcome = if ok { "ok" } else { "error" };
    CATALOG_OPERATIONS_TOTAL.with_label_values(&[op, outcome]).inc();
}

pub fn encode_metrics() -> (StatusCode, String) {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return (StatusCode::INTERNAL_SERVER_ERROR, format!("metrics encode error: {e}"));
    }
    (StatusCode::OK, String::from_utf8(buffer).unwrap_or_default())
}
