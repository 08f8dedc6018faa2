//! Sliding-window request history per (client, scope).

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use restkit_core::{Clock, RateScope, RetryAfter, ScopeUsage, from_unix_seconds, to_unix_seconds};
use restkit_store::{CacheStore, StoreError};
use serde_json::Value;
use tracing::{debug, warn};

/// Outcome of recording one request against a scope.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowDecision {
    pub allowed: bool,
    pub usage: ScopeUsage,
    /// Fractional seconds until the oldest request leaves the window.
    pub retry_after: f64,
}

/// Tracks request timestamps in the shared store.
///
/// The history under a key is a JSON array of fractional Unix seconds,
/// oldest first. Every read drops timestamps with `now - ts >= window`.
/// The read-modify-write in [`record_and_evaluate`](Self::record_and_evaluate)
/// is not atomic: two requests at the same instant may both be admitted.
#[derive(Clone)]
pub struct RateWindowTracker {
    store: Arc<dyn CacheStore>,
    clock: Arc<dyn Clock>,
}

impl RateWindowTracker {
    pub fn new(store: Arc<dyn CacheStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Records a request unless the window is already full.
    ///
    /// Blocks when the pruned history holds `limit` or more entries, so the
    /// `limit`-th request in a window is the last one admitted. A blocked
    /// request leaves the history untouched.
    pub async fn record_and_evaluate(
        &self,
        client_key: &str,
        scope: &RateScope,
    ) -> Result<WindowDecision, StoreError> {
        let now = self.clock.now();
        let mut history = self.load(client_key, scope, now).await?;

        if history.len() as u64 >= u64::from(scope.limit()) {
            let usage = usage_for(scope, &history, now);
            let retry_after = precise_retry_after(scope, &history, now);
            debug!(key = client_key, scope = scope.name(), retry_after, "Window full");
            return Ok(WindowDecision {
                allowed: false,
                usage,
                retry_after,
            });
        }

        history.push(to_unix_seconds(now));
        self.store
            .set(client_key, Value::from(history.clone()), scope.window())
            .await?;

        Ok(WindowDecision {
            allowed: true,
            usage: usage_for(scope, &history, now),
            retry_after: 0.0,
        })
    }

    /// Usage of a scope with no recorded history.
    pub fn fresh(&self, scope: &RateScope) -> ScopeUsage {
        usage_for(scope, &[], self.clock.now())
    }

    /// Current usage without recording anything.
    pub async fn peek(&self, client_key: &str, scope: &RateScope) -> Result<ScopeUsage, StoreError> {
        let now = self.clock.now();
        let history = self.load(client_key, scope, now).await?;
        Ok(usage_for(scope, &history, now))
    }

    async fn load(
        &self,
        client_key: &str,
        scope: &RateScope,
        now: DateTime<Utc>,
    ) -> Result<Vec<f64>, StoreError> {
        let Some(raw) = self.store.get(client_key).await? else {
            return Ok(Vec::new());
        };

        let history: Vec<f64> = match serde_json::from_value(raw) {
            Ok(history) => history,
            Err(e) => {
                // Una entrada ilegible cuenta como ventana vacia
                warn!(key = client_key, error = %e, "Discarding unreadable rate history");
                return Ok(Vec::new());
            },
        };

        let now = to_unix_seconds(now);
        let window = scope.window_seconds() as f64;
        Ok(history.into_iter().filter(|ts| now - ts < window).collect())
    }
}

impl std::fmt::Debug for RateWindowTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateWindowTracker")
            .field("store", &self.store.name())
            .field("clock", &self.clock)
            .finish()
    }
}

fn usage_for(scope: &RateScope, history: &[f64], now: DateTime<Utc>) -> ScopeUsage {
    let remaining = u64::from(scope.limit()).saturating_sub(history.len() as u64) as u32;
    let window = TimeDelta::seconds(scope.window_seconds() as i64);

    let start = history
        .first()
        .and_then(|ts| from_unix_seconds(*ts))
        .unwrap_or(now);
    let reset_time = start.checked_add_signed(window).unwrap_or(start);

    let wait = (reset_time - now).num_microseconds().unwrap_or(0).max(0);
    let retry_after = (wait as u64).div_ceil(1_000_000);

    ScopeUsage {
        limit: scope.limit(),
        remaining,
        reset_time: Some(reset_time),
        retry_after: RetryAfter::seconds(retry_after),
    }
}

fn precise_retry_after(scope: &RateScope, history: &[f64], now: DateTime<Utc>) -> f64 {
    let window = scope.window_seconds() as f64;
    match history.first() {
        Some(first) => (window - (to_unix_seconds(now) - first)).max(0.0),
        None => window,
    }
}
