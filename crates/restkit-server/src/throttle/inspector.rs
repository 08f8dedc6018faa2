//! Throttle inspection (read-only report) and enforcement (admission).

use std::collections::BTreeMap;

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header::RETRY_AFTER},
    response::{IntoResponse, Response},
};
use restkit_core::{RateScope, Result, ScopeUsage, ThrottleReport};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::ThrottleSettings;
use crate::metrics::throttle as throttle_metrics;
use crate::throttle::classes::{ClientIdentity, ThrottleSet};
use crate::throttle::window::RateWindowTracker;

/// Body detail of a 429 response.
pub const REJECTION_DETAIL: &str = "Too many requests. Please try again later.";

/// Result of enforcing the throttles of a request.
#[derive(Debug, Clone, PartialEq)]
pub enum Admission {
    Allowed,
    Rejected(Rejection),
}

impl Admission {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Admission::Allowed)
    }
}

/// The scope that refused a request and when to retry.
#[derive(Debug, Clone, PartialEq)]
pub struct Rejection {
    pub scope: String,
    /// Seconds, rounded to two decimals.
    pub retry_after: f64,
}

#[derive(Serialize)]
struct RetryAfterBody {
    time: f64,
    unit: &'static str,
}

#[derive(Serialize)]
struct RejectionBody {
    detail: &'static str,
    retry_after: RetryAfterBody,
}

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        let body = Json(RejectionBody {
            detail: REJECTION_DETAIL,
            retry_after: RetryAfterBody {
                time: self.retry_after,
                unit: "seconds",
            },
        });

        let mut response = (StatusCode::TOO_MANY_REQUESTS, body).into_response();
        let seconds = self.retry_after.max(0.0).ceil() as u64;
        response
            .headers_mut()
            .insert(RETRY_AFTER, HeaderValue::from(seconds));
        response
    }
}

/// Evaluates a [`ThrottleSet`] against the configured rates.
///
/// Rates are parsed once when the inspector is built. Both operations walk
/// the set in declared order and skip throttles whose scope has no rate.
#[derive(Debug, Clone)]
pub struct ThrottleInspector {
    tracker: RateWindowTracker,
    rates: BTreeMap<String, RateScope>,
    fail_closed: bool,
}

impl ThrottleInspector {
    /// Fails with a configuration error when a rate string is malformed.
    pub fn new(tracker: RateWindowTracker, settings: &ThrottleSettings) -> Result<Self> {
        let rates = settings
            .rates
            .iter()
            .map(|(scope, rate)| RateScope::parse(scope.as_str(), rate).map(|r| (scope.clone(), r)))
            .collect::<Result<BTreeMap<_, _>>>()?;

        Ok(Self {
            tracker,
            rates,
            fail_closed: settings.fail_closed,
        })
    }

    pub fn rate_for(&self, scope: &str) -> Option<&RateScope> {
        self.rates.get(scope)
    }

    pub fn tracker(&self) -> &RateWindowTracker {
        &self.tracker
    }

    /// Current usage of every applicable scope. Never records a request.
    pub async fn inspect(&self, client: &ClientIdentity, throttles: &ThrottleSet) -> ThrottleReport {
        let mut report = ThrottleReport::default();

        for throttle in throttles.iter() {
            let scope = throttle.scope();
            let Some(rate) = self.rate_for(&scope) else {
                warn!(scope = %scope, class = throttle.class_name(), "No rate limit found for scope. Skipping.");
                continue;
            };

            let usage = match throttle.cache_key(client, &scope) {
                Some(key) => self.peek_or_fresh(&key, rate).await,
                None => self.tracker.fresh(rate),
            };

            if usage.is_exhausted() && report.throttled_by().is_none() {
                info!(scope = %scope, "Request throttled by scope");
            }
            report.record(scope, usage);
        }

        report
    }

    async fn peek_or_fresh(&self, key: &str, rate: &RateScope) -> ScopeUsage {
        match self.tracker.peek(key, rate).await {
            Ok(usage) => usage,
            Err(e) => {
                throttle_metrics::record_store_error(rate.name(), false);
                warn!(key, error = %e, "Rate history unavailable, reporting full quota");
                self.tracker.fresh(rate)
            },
        }
    }

    /// Records the request against each scope; the first full window
    /// rejects it. Scopes before the rejecting one keep the recorded
    /// request.
    pub async fn enforce(&self, client: &ClientIdentity, throttles: &ThrottleSet) -> Admission {
        for throttle in throttles.iter() {
            let scope = throttle.scope();
            let Some(rate) = self.rate_for(&scope) else {
                warn!(scope = %scope, class = throttle.class_name(), "No rate limit found for scope. Skipping.");
                continue;
            };
            let Some(key) = throttle.cache_key(client, &scope) else {
                continue;
            };

            match self.tracker.record_and_evaluate(&key, rate).await {
                Ok(decision) if decision.allowed => {
                    debug!(scope = %scope, remaining = decision.usage.remaining, "Request admitted");
                },
                Ok(decision) => {
                    throttle_metrics::record_rejection(&scope);
                    info!(scope = %scope, client = client.ident(), "Request rejected by throttle");
                    return Admission::Rejected(Rejection {
                        scope,
                        retry_after: round_hundredths(decision.retry_after),
                    });
                },
                Err(e) => {
                    throttle_metrics::record_store_error(&scope, self.fail_closed);
                    warn!(scope = %scope, error = %e, fail_closed = self.fail_closed, "Rate history unavailable");
                    if self.fail_closed {
                        return Admission::Rejected(Rejection {
                            scope,
                            retry_after: rate.window_seconds() as f64,
                        });
                    }
                },
            }
        }

        Admission::Allowed
    }
}

fn round_hundredths(seconds: f64) -> f64 {
    (seconds * 100.0).round() / 100.0
}
