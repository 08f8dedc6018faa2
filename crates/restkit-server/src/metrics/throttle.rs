//! Throttle metrics recording.

use metrics::counter;

/// Registra las metricas de throttling.
pub fn register_throttle_metrics() {
    metrics::describe_counter!(
        "restkit_throttle_rejections_total",
        "Requests rejected with 429 per scope"
    );
    metrics::describe_counter!(
        "restkit_throttle_store_errors_total",
        "Rate history reads or writes that failed"
    );
}

/// Registra un rechazo por scope
pub fn record_rejection(scope: &str) {
    counter!("restkit_throttle_rejections_total", "scope" => scope.to_string()).increment(1);
}

/// Registra un error del store, indicando si la request se rechazo igual
pub fn record_store_error(scope: &str, fail_closed: bool) {
    counter!(
        "restkit_throttle_store_errors_total",
        "scope" => scope.to_string(),
        "policy" => if fail_closed { "closed" } else { "open" }
    )
    .increment(1);
}
