//! Moka-backed store implementation.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use glob::Pattern;
use moka::Expiry;
use moka::future::Cache;
use serde_json::Value;
use tracing::{debug, info};

use crate::error::StoreError;
use crate::store::{CacheStore, PatternDelete};

/// Default maximum number of entries.
pub const DEFAULT_MAX_CAPACITY: u64 = 10_000;

#[derive(Clone)]
struct StoredEntry {
    value: Arc<Value>,
    ttl: Duration,
}

/// Expira cada entry segun el TTL con que fue escrita.
struct PerEntryTtl;

impl Expiry<String, StoredEntry> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &StoredEntry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &StoredEntry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// In-process cache store using Moka.
/// Thread-safe y async-friendly; supports glob pattern deletion.
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
/// use restkit_store::{CacheStore, MokaStore};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), restkit_store::StoreError> {
/// let store = MokaStore::new(10_000);
/// store.set("todos_detail_1", serde_json::json!({"id": 1}), Duration::from_secs(300)).await?;
/// assert!(store.get("todos_detail_1").await?.is_some());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct MokaStore {
    inner: Cache<String, StoredEntry>,
}

impl MokaStore {
    /// Crea un nuevo store con la capacidad maxima dada.
    pub fn new(max_capacity: u64) -> Self {
        let inner = Cache::builder()
            .max_capacity(max_capacity)
            .expire_after(PerEntryTtl)
            .build();

        Self { inner }
    }

    /// Retorna el numero aproximado de entries.
    pub fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }

    /// Removes every entry.
    pub fn clear(&self) {
        self.inner.invalidate_all();
    }

    /// Fuerza la limpieza de entries expiradas (para tests principalmente).
    pub async fn sync(&self) {
        self.inner.run_pending_tasks().await;
    }
}

impl Default for MokaStore {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CAPACITY)
    }
}

#[async_trait]
impl CacheStore for MokaStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self
            .inner
            .get(key)
            .await
            .map(|entry| entry.value.as_ref().clone()))
    }

    async fn set(&self, key: &str, value: Value, ttl: Duration) -> Result<(), StoreError> {
        self.inner
            .insert(
                key.to_string(),
                StoredEntry {
                    value: Arc::new(value),
                    ttl,
                },
            )
            .await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.inner.remove(key).await.is_some())
    }

    fn name(&self) -> &str {
        "moka"
    }

    fn pattern_delete(&self) -> Option<&dyn PatternDelete> {
        Some(self)
    }
}

#[async_trait]
impl PatternDelete for MokaStore {
    async fn delete_pattern(&self, pattern_str: &str) -> Result<usize, StoreError> {
        let pattern = Pattern::new(pattern_str).map_err(|e| {
            debug!(pattern = %pattern_str, error = %e, "Invalid glob pattern");
            StoreError::InvalidPattern {
                pattern: pattern_str.to_string(),
                reason: e.to_string(),
            }
        })?;

        // Snapshot: entries pueden cambiar durante la iteracion
        let matching: Vec<Arc<String>> = self
            .inner
            .iter()
            .filter(|(key, _)| pattern.matches(key))
            .map(|(key, _)| key)
            .collect();

        let mut count = 0;
        for key in matching {
            if self.inner.remove(key.as_str()).await.is_some() {
                count += 1;
            }
        }

        info!(
            pattern = %pattern_str,
            count = count,
            "Cache entries deleted by pattern"
        );

        Ok(count)
    }
}

impl std::fmt::Debug for MokaStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MokaStore")
            .field("entry_count", &self.entry_count())
            .finish()
    }
}
