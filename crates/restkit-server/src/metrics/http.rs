//! HTTP metrics middleware.

use axum::{body::Body, extract::MatchedPath, http::Request, middleware::Next, response::Response};
use metrics::{counter, gauge, histogram};
use std::time::Instant;

const REQUESTS_TOTAL: &str = "restkit_http_requests_total";
const REQUEST_DURATION: &str = "restkit_http_request_duration_seconds";
const REQUESTS_IN_FLIGHT: &str = "restkit_http_requests_in_flight";

/// Etiqueta para requests sin ruta asociada (404 de routing)
const UNMATCHED_PATH: &str = "unmatched";

/// Middleware que registra metricas HTTP para cada request.
///
/// El label `path` usa la plantilla de la ruta (`/todos/{id}`), nunca la
/// URI concreta.
pub async fn http_metrics_middleware(
    matched_path: Option<MatchedPath>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = request.method().as_str().to_owned();
    let path = matched_path.map_or_else(|| UNMATCHED_PATH.to_owned(), |p| p.as_str().to_owned());

    gauge!(REQUESTS_IN_FLIGHT).increment(1.0);
    let response = next.run(request).await;
    gauge!(REQUESTS_IN_FLIGHT).decrement(1.0);

    let status = response.status();
    counter!(
        REQUESTS_TOTAL,
        "method" => method.clone(),
        "path" => path.clone(),
        "status" => status.as_u16().to_string()
    )
    .increment(1);

    histogram!(REQUEST_DURATION, "method" => method, "path" => path)
        .record(start.elapsed().as_secs_f64());

    response
}

/// Registra las metricas HTTP
pub fn register_http_metrics() {
    metrics::describe_counter!(REQUESTS_TOTAL, "Total number of HTTP requests by route and status");
    metrics::describe_histogram!(
        REQUEST_DURATION,
        metrics::Unit::Seconds,
        "HTTP request duration by route"
    );
    metrics::describe_gauge!(REQUESTS_IN_FLIGHT, "HTTP requests currently being served");
}
