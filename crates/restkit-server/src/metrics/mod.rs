//! Metrics for the HTTP layer, the response cache and throttling.

pub mod cache;
pub mod http;
pub mod setup;
pub mod throttle;

pub use cache::CacheMetrics;
pub use setup::{detached_handle, init_metrics};
