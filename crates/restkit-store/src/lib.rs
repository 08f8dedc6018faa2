//! # Restkit Store
//!
//! Keyed, expiring key-value store abstraction used by the Restkit cache
//! and throttle layers.
//!
//! ## Features
//!
//! - Async trait-based store abstraction (`CacheStore`)
//! - Optional pattern-delete capability (`PatternDelete`) that callers check
//!   for instead of requiring
//! - Moka-backed in-process implementation with per-entry TTL and glob
//!   pattern deletion
//!
//! ## Example
//!
//! ```ignore
//! use restkit_store::{CacheStore, MokaStore};
//!
//! let store = MokaStore::new(10_000);
//! store.set("todos_detail_1", json!({"id": 1}), Duration::from_secs(300)).await?;
//!
//! if let Some(patterns) = store.pattern_delete() {
//!     patterns.delete_pattern("todos_list_*").await?;
//! }
//! ```

pub mod backend;
pub mod error;
pub mod store;

// Re-exports
pub use backend::{DEFAULT_MAX_CAPACITY, MokaStore};
pub use error::StoreError;
pub use store::{CacheStore, PatternDelete};

// Re-export restkit_core for consumers
pub use restkit_core;
