//! Response cache for resource view sets.
//!
//! This module provides deterministic key generation, get-or-set caching on
//! top of any [`restkit_store::CacheStore`], and invalidation of detail and
//! list entries after mutations.

pub mod invalidation;
pub mod keys;
pub mod orchestrator;

#[cfg(test)]
pub(crate) mod testing;

// Re-exports
pub use invalidation::InvalidationResult;
pub use keys::{ActionKind, CacheKey, CacheKeyBuilder};
pub use orchestrator::{CacheConfig, CacheOrchestrator};
