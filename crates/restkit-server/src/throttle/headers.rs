//! `X-Throttle-*` response headers.

use axum::http::{HeaderMap, HeaderName, HeaderValue};
use restkit_core::ThrottleReport;
use tracing::{debug, warn};

/// Writes four headers per scope of the report:
///
/// | header                          | value                              |
/// |---------------------------------|------------------------------------|
/// | `X-Throttle-{scope}-Limit`      | limit                              |
/// | `X-Throttle-{scope}-Remaining`  | remaining requests                 |
/// | `X-Throttle-{scope}-Reset`      | ISO-8601 reset time, or empty      |
/// | `X-Throttle-{scope}-Retry-After`| whole seconds, `0` when unknown    |
///
/// Scopes that do not form a valid header name are skipped.
pub fn attach_headers(headers: &mut HeaderMap, report: &ThrottleReport) {
    for (scope, usage) in report.iter() {
        let reset = usage.reset_time_iso().unwrap_or_default();
        let values = [
            ("Limit", usage.limit.to_string()),
            ("Remaining", usage.remaining.to_string()),
            ("Reset", reset),
            ("Retry-After", usage.retry_after_seconds().to_string()),
        ];

        for (suffix, value) in values {
            let name = format!("x-throttle-{}-{}", scope, suffix);
            match (
                HeaderName::from_bytes(name.to_ascii_lowercase().as_bytes()),
                HeaderValue::from_str(&value),
            ) {
                (Ok(name), Ok(value)) => {
                    headers.insert(name, value);
                },
                _ => {
                    warn!(scope, header = %name, "Skipping invalid throttle header");
                },
            }
        }
    }

    if !report.is_empty() {
        debug!(scopes = report.len(), "Throttle headers attached");
    }
}
