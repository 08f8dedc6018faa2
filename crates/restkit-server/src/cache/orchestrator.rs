//! Get-or-set response caching on top of a [`CacheStore`].

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use restkit_store::CacheStore;
use serde_json::Value;
use tracing::{debug, warn};

use crate::cache::keys::{CacheKey, CacheKeyBuilder};
use crate::metrics::CacheMetrics;

/// Configuracion del cache de respuestas.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL en segundos (default: 300 = 5 minutos)
    pub ttl_seconds: u64,
    /// Maximo numero de entries del store en memoria (default: 10000)
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: 300,
            max_capacity: 10_000,
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }
}

/// Caches computed values for one resource namespace and invalidates them
/// after mutations.
///
/// There is no stampede protection: concurrent misses on the same key may
/// each run the computation and write the result. Store failures never fail
/// the request; reads fall back to computing and writes are skipped.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use restkit_server::cache::{CacheConfig, CacheOrchestrator};
/// use restkit_store::MokaStore;
///
/// # #[tokio::main]
/// # async fn main() {
/// let cache = CacheOrchestrator::new(Arc::new(MokaStore::default()), "todos", &CacheConfig::default());
/// let key = cache.keys().detail("1").unwrap();
///
/// let value = cache
///     .get_or_set(&key, || async { Ok::<_, std::convert::Infallible>(serde_json::json!({"id": 1})) }, None)
///     .await
///     .unwrap();
/// # }
/// ```
#[derive(Clone)]
pub struct CacheOrchestrator {
    store: Arc<dyn CacheStore>,
    keys: CacheKeyBuilder,
    default_ttl: Duration,
    metrics: CacheMetrics,
}

impl CacheOrchestrator {
    /// Crea un orquestador para el namespace dado.
    pub fn new(store: Arc<dyn CacheStore>, namespace: impl Into<String>, config: &CacheConfig) -> Self {
        let keys = CacheKeyBuilder::new(namespace);
        let metrics = CacheMetrics::new(keys.namespace());

        Self {
            store,
            keys,
            default_ttl: config.ttl(),
            metrics,
        }
    }

    /// Overrides the default TTL for this resource.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    pub fn keys(&self) -> &CacheKeyBuilder {
        &self.keys
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    pub(crate) fn store(&self) -> &dyn CacheStore {
        self.store.as_ref()
    }

    /// Retorna las metricas para acceso externo.
    pub fn metrics(&self) -> &CacheMetrics {
        &self.metrics
    }

    /// Returns the cached value under `key`, or runs `compute` once, stores
    /// its result for `ttl` (default TTL when `None`) and returns it.
    ///
    /// Errors from `compute` are returned as-is and nothing is stored.
    pub async fn get_or_set<F, Fut, E>(
        &self,
        key: &CacheKey,
        compute: F,
        ttl: Option<Duration>,
    ) -> Result<Value, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value, E>>,
    {
        let start = Instant::now();

        match self.store.get(key.as_str()).await {
            Ok(Some(cached)) => {
                self.metrics.record_hit();
                self.metrics
                    .record_operation_duration("get_or_set_hit", start.elapsed());
                debug!(key = %key, "Cache hit");
                return Ok(cached);
            },
            Ok(None) => {},
            Err(e) => {
                self.metrics.record_store_error("get");
                warn!(key = %key, store = self.store.name(), error = %e, "Cache read failed, computing uncached");
            },
        }

        self.metrics.record_miss();

        let value = compute().await?;

        let ttl = ttl.unwrap_or(self.default_ttl);
        if let Err(e) = self.store.set(key.as_str(), value.clone(), ttl).await {
            self.metrics.record_store_error("set");
            warn!(key = %key, store = self.store.name(), error = %e, "Cache write failed");
        }

        self.metrics
            .record_operation_duration("get_or_set_miss", start.elapsed());
        debug!(key = %key, ttl_seconds = ttl.as_secs(), "Cache miss stored");

        Ok(value)
    }
}

impl std::fmt::Debug for CacheOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheOrchestrator")
            .field("namespace", &self.keys.namespace())
            .field("store", &self.store.name())
            .field("default_ttl", &self.default_ttl)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::testing::{FailingStore, PlainStore};
    use restkit_store::MokaStore;
    use serde_json::json;
    use std::convert::Infallible;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn orchestrator() -> CacheOrchestrator {
        CacheOrchestrator::new(Arc::new(MokaStore::default()), "todos", &CacheConfig::default())
    }

    #[tokio::test]
    async fn test_get_or_set_computes_once() {
        let cache = orchestrator();
        let key = cache.keys().detail("1").unwrap();
        let call_count = Arc::new(AtomicU32::new(0));

        for _ in 0..2 {
            let count = Arc::clone(&call_count);
            let value = cache
                .get_or_set(
                    &key,
                    || async move {
                        count.fetch_add(1, Ordering::SeqCst);
                        Ok::<_, Infallible>(json!({"id": 1, "title": "write docs"}))
                    },
                    None,
                )
                .await
                .unwrap();
            assert_eq!(value["title"], "write docs");
        }

        assert_eq!(call_count.load(Ordering::SeqCst), 1);
        assert_eq!(cache.metrics().hits(), 1);
        assert_eq!(cache.metrics().misses(), 1);
    }

    #[tokio::test]
    async fn test_hit_returns_stored_value_unchanged() {
        let cache = orchestrator();
        let key = cache.keys().detail("1").unwrap();

        cache
            .get_or_set(&key, || async { Ok::<_, Infallible>(json!("first")) }, None)
            .await
            .unwrap();
        let second = cache
            .get_or_set(&key, || async { Ok::<_, Infallible>(json!("second")) }, None)
            .await
            .unwrap();

        assert_eq!(second, json!("first"));
    }

    #[tokio::test]
    async fn test_compute_error_is_not_cached() {
        let cache = orchestrator();
        let key = cache.keys().detail("1").unwrap();

        let result = cache
            .get_or_set(&key, || async { Err::<Value, _>("boom") }, None)
            .await;
        assert_eq!(result, Err("boom"));

        let value = cache
            .get_or_set(&key, || async { Ok::<_, &str>(json!(42)) }, None)
            .await
            .unwrap();
        assert_eq!(value, json!(42));
    }

    #[tokio::test]
    async fn test_custom_ttl_expires() {
        let cache = orchestrator();
        let key = cache.keys().detail("1").unwrap();

        cache
            .get_or_set(
                &key,
                || async { Ok::<_, Infallible>(json!(1)) },
                Some(Duration::from_millis(50)),
            )
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(120)).await;

        let value = cache
            .get_or_set(&key, || async { Ok::<_, Infallible>(json!(2)) }, None)
            .await
            .unwrap();
        assert_eq!(value, json!(2));
    }

    #[tokio::test]
    async fn test_store_failure_fails_open() {
        let cache =
            CacheOrchestrator::new(Arc::new(FailingStore), "todos", &CacheConfig::default());
        let key = cache.keys().detail("1").unwrap();

        let value = cache
            .get_or_set(&key, || async { Ok::<_, Infallible>(json!({"id": 1})) }, None)
            .await
            .unwrap();

        assert_eq!(value, json!({"id": 1}));
    }

    #[tokio::test]
    async fn test_with_ttl_overrides_default() {
        let cache = CacheOrchestrator::new(
            Arc::new(PlainStore::default()),
            "todos",
            &CacheConfig::default(),
        )
        .with_ttl(Duration::from_secs(30));

        assert_eq!(cache.default_ttl(), Duration::from_secs(30));
    }
}
