//! Cache store trait definitions.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::StoreError;

/// A keyed, expiring key-value store shared by every request.
///
/// Values are JSON documents. Implementations own expiry: an entry stored
/// with a TTL must stop being returned once the TTL has elapsed.
///
/// # Implementors
///
/// - `MokaStore` - In-process store backed by Moka
/// - (Future) a Redis-backed store for multi-process deployments
///
/// # Example
///
/// ```ignore
/// use restkit_store::{CacheStore, StoreError};
///
/// struct NullStore;
///
/// #[async_trait]
/// impl CacheStore for NullStore {
///     async fn get(&self, _key: &str) -> Result<Option<Value>, StoreError> {
///         Ok(None)
///     }
///
///     async fn set(&self, _key: &str, _value: Value, _ttl: Duration) -> Result<(), StoreError> {
///         Ok(())
///     }
///
///     async fn delete(&self, _key: &str) -> Result<bool, StoreError> {
///         Ok(false)
///     }
///
///     fn name(&self) -> &str {
///         "null"
///     }
/// }
/// ```
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Returns the value stored under `key`, if present and not expired.
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;

    /// Stores `value` under `key` for `ttl`, replacing any previous entry.
    async fn set(&self, key: &str, value: Value, ttl: Duration) -> Result<(), StoreError>;

    /// Removes `key`. Returns true if an entry was removed.
    async fn delete(&self, key: &str) -> Result<bool, StoreError>;

    /// Returns the name of this store.
    ///
    /// This is used for logging and identification purposes.
    fn name(&self) -> &str;

    /// Returns the pattern-delete capability, if this store has one.
    ///
    /// The default implementation reports no support; callers must degrade
    /// (skip broad invalidation) rather than fail.
    fn pattern_delete(&self) -> Option<&dyn PatternDelete> {
        None
    }
}

/// Optional capability: delete every key matching a glob pattern.
#[async_trait]
pub trait PatternDelete: Send + Sync {
    /// Deletes all keys matching `pattern` (`*` and `?` wildcards).
    /// Returns the number of deleted entries.
    async fn delete_pattern(&self, pattern: &str) -> Result<usize, StoreError>;
}
