//! Cache metrics recording.

use metrics::{counter, histogram};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Registra las metricas de cache.
/// Llamar una vez al inicio para registrar las metricas.
pub fn register_cache_metrics() {
    // Describir metricas
    metrics::describe_counter!("restkit_cache_hits_total", "Total number of cache hits");
    metrics::describe_counter!("restkit_cache_misses_total", "Total number of cache misses");
    metrics::describe_counter!(
        "restkit_cache_store_errors_total",
        "Cache store operations that failed and were bypassed"
    );
    metrics::describe_counter!(
        "restkit_cache_invalidations_total",
        "Total number of cache entries deleted by invalidation"
    );
    metrics::describe_histogram!(
        "restkit_cache_operation_seconds",
        "Time spent on cache operations"
    );
}

/// Recorder de metricas de cache.
/// Usa atomic counters internos para poder consultarlos en tests.
#[derive(Debug, Clone)]
pub struct CacheMetrics {
    namespace: Arc<str>,
    hits: Arc<AtomicU64>,
    misses: Arc<AtomicU64>,
}

impl CacheMetrics {
    pub fn new(namespace: &str) -> Self {
        Self {
            namespace: Arc::from(namespace),
            hits: Arc::new(AtomicU64::new(0)),
            misses: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Registra un cache hit
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
        counter!("restkit_cache_hits_total", "namespace" => self.namespace.to_string()).increment(1);
    }

    /// Registra un cache miss
    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
        counter!("restkit_cache_misses_total", "namespace" => self.namespace.to_string())
            .increment(1);
    }

    /// Registra un error del store que fue ignorado
    pub fn record_store_error(&self, operation: &str) {
        counter!(
            "restkit_cache_store_errors_total",
            "namespace" => self.namespace.to_string(),
            "operation" => operation.to_string()
        )
        .increment(1);
    }

    /// Registra entries borradas por invalidacion
    pub fn record_invalidated(&self, count: usize) {
        counter!("restkit_cache_invalidations_total", "namespace" => self.namespace.to_string())
            .increment(count as u64);
    }

    /// Registra la duracion de una operacion
    pub fn record_operation_duration(&self, operation: &str, duration: Duration) {
        histogram!(
            "restkit_cache_operation_seconds",
            "operation" => operation.to_string()
        )
        .record(duration.as_secs_f64());
    }

    /// Calcula hit rate (para logging/debugging)
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits.load(Ordering::Relaxed) as f64;
        let misses = self.misses.load(Ordering::Relaxed) as f64;
        let total = hits + misses;
        if total == 0.0 { 0.0 } else { hits / total }
    }

    /// Retorna el numero de hits
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Retorna el numero de misses
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }
}
