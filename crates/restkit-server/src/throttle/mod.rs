//! Per-client rate limiting.
//!
//! - [`RateWindowTracker`]: sliding-window history per (client, scope)
//! - [`ThrottleSet`] and the throttle classes: which scopes apply to whom
//! - [`ThrottleInspector`]: read-only reports and 429 enforcement
//! - [`attach_headers`]: `X-Throttle-*` response headers

pub mod classes;
pub mod headers;
pub mod inspector;
pub mod window;

pub use classes::{
    ANONYMOUS, AnonRateThrottle, ClientIdentity, NamedRateThrottle, Throttle, ThrottleSet,
    UserRateThrottle,
};
pub use headers::attach_headers;
pub use inspector::{Admission, REJECTION_DETAIL, Rejection, ThrottleInspector};
pub use window::{RateWindowTracker, WindowDecision};
