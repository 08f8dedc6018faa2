//! Per-scope usage and the aggregated throttle report.

use chrono::{DateTime, SecondsFormat, Utc};
use indexmap::IndexMap;
use serde::{Serialize, Serializer};

/// Retry hint in the `{"time": n, "unit": "seconds"}` shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RetryAfter {
    pub time: Option<u64>,
    pub unit: &'static str,
}

impl RetryAfter {
    pub fn seconds(time: u64) -> Self {
        Self {
            time: Some(time),
            unit: "seconds",
        }
    }

    /// Used when the request has no client context to inspect.
    pub fn unknown() -> Self {
        Self {
            time: None,
            unit: "seconds",
        }
    }
}

/// Current quota for one scope as seen by one client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScopeUsage {
    pub limit: u32,
    pub remaining: u32,
    #[serde(serialize_with = "serialize_reset_time")]
    pub reset_time: Option<DateTime<Utc>>,
    pub retry_after: RetryAfter,
}

impl ScopeUsage {
    /// Usage for a scope whose history was never recorded.
    pub fn untouched(limit: u32) -> Self {
        Self {
            limit,
            remaining: limit,
            reset_time: None,
            retry_after: RetryAfter::unknown(),
        }
    }

    /// Reset time formatted as ISO-8601 with microseconds and a `+00:00`
    /// offset.
    pub fn reset_time_iso(&self) -> Option<String> {
        self.reset_time.map(format_iso)
    }

    /// Retry-after in whole seconds, `0` when unknown.
    pub fn retry_after_seconds(&self) -> u64 {
        self.retry_after.time.unwrap_or(0)
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }
}

fn format_iso(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Micros, false)
}

fn serialize_reset_time<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(instant) => serializer.serialize_str(&format_iso(*instant)),
        None => serializer.serialize_none(),
    }
}

/// Throttle state of every configured scope for a single request.
///
/// Scopes keep their declared order. `throttled_by` names the first scope
/// whose remaining quota reached zero; later scopes are still recorded.
///
/// # Example
///
/// ```
/// use restkit_core::{ScopeUsage, ThrottleReport};
///
/// let mut report = ThrottleReport::default();
/// report.record("anon", ScopeUsage::untouched(0));
/// report.record("user", ScopeUsage::untouched(0));
///
/// assert_eq!(report.throttled_by(), Some("anon"));
/// assert_eq!(report.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ThrottleReport {
    throttled_by: Option<String>,
    throttles: IndexMap<String, ScopeUsage>,
}

impl ThrottleReport {
    /// Adds a scope to the report.
    pub fn record(&mut self, scope: impl Into<String>, usage: ScopeUsage) {
        let scope = scope.into();
        if usage.is_exhausted() && self.throttled_by.is_none() {
            self.throttled_by = Some(scope.clone());
        }
        self.throttles.insert(scope, usage);
    }

    pub fn throttled_by(&self) -> Option<&str> {
        self.throttled_by.as_deref()
    }

    pub fn get(&self, scope: &str) -> Option<&ScopeUsage> {
        self.throttles.get(scope)
    }

    /// Iterates scopes in declared order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ScopeUsage)> {
        self.throttles.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.throttles.is_empty()
    }

    pub fn len(&self) -> usize {
        self.throttles.len()
    }
}
