//! Restkit Server - HTTP layer for Restkit
//!
//! This crate provides the Axum-based pieces of the toolkit: response
//! caching for resource view sets, per-client throttling with usage
//! inspection, choice-field helpers, pagination, and a demo todos service
//! wired together by [`server::create_router_with_state`].

pub mod auth;
pub mod cache;
pub mod choices;
pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod pagination;
pub mod server;
pub mod state;
pub mod throttle;
pub mod todos;
pub mod viewset;

pub use auth::{Authenticator, StaticTokens};
pub use cache::{CacheKeyBuilder, CacheOrchestrator, InvalidationResult};
pub use config::{Settings, SettingsHandle};
pub use error::AppError;
pub use server::{create_router, create_router_with_state, run_server_with_state};
pub use state::AppState;
pub use throttle::{ClientIdentity, ThrottleInspector, ThrottleSet};
pub use viewset::{CachedViewSet, Resource};

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_defined() {
        assert!(!version().is_empty());
    }
}
