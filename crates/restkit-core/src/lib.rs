//! Restkit Core - Domain types
//!
//! This crate provides the foundational types shared by the Restkit cache
//! and throttle layers: rate scopes, scope-name derivation, usage reports,
//! clocks and the error hierarchy.

pub mod clock;
pub mod error;
pub mod rate;
pub mod scope;
pub mod usage;

pub use clock::{Clock, ManualClock, SystemClock, from_unix_seconds, to_unix_seconds};
pub use error::{Result, ToolkitError};
pub use rate::{Period, RateScope, parse_rate};
pub use scope::{THROTTLE_SUFFIX, derive_scope_name};
pub use usage::{RetryAfter, ScopeUsage, ThrottleReport};

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
