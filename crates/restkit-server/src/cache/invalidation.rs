//! Cache invalidation after mutations.

use restkit_core::ToolkitError;
use tracing::{debug, info, warn};

use crate::cache::CacheOrchestrator;
use crate::cache::keys::ActionKind;

/// Resultado de una operación de invalidación.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvalidationResult {
    /// Número de entries borradas (exactas y por patrón).
    pub deleted: usize,
    /// Patrones aplicados.
    pub patterns: Vec<String>,
    /// `true` cuando el store no soporta borrado por patrón y las listas no
    /// se limpiaron.
    pub broad_flush_skipped: bool,
}

impl CacheOrchestrator {
    /// Removes the entries a mutation may have made stale.
    ///
    /// Deletes the detail key of `entity_id` and the detail key of each
    /// custom action for it, then every list key of the namespace and of
    /// each action. List keys are only reachable by pattern; when the store
    /// has no pattern delete they are left to expire with their TTL.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use std::sync::Arc;
    /// # use restkit_server::cache::{CacheConfig, CacheOrchestrator};
    /// # use restkit_store::MokaStore;
    /// # #[tokio::main]
    /// # async fn main() {
    /// # let cache = CacheOrchestrator::new(Arc::new(MokaStore::default()), "todos", &CacheConfig::default());
    /// let result = cache.invalidate(Some("5"), &["summary".to_string()]).await;
    /// println!("Invalidated {} entries", result.deleted);
    /// # }
    /// ```
    pub async fn invalidate(&self, entity_id: Option<&str>, actions: &[String]) -> InvalidationResult {
        let mut result = InvalidationResult::default();

        if let Some(id) = entity_id {
            let mut exact = Vec::with_capacity(actions.len() + 1);
            exact.extend(self.keys().detail(id));
            for action in actions {
                exact.extend(
                    self.keys()
                        .build(ActionKind::CustomDetail, Some(id), Some(action), None),
                );
            }

            for key in exact {
                match self.store().delete(key.as_str()).await {
                    Ok(true) => result.deleted += 1,
                    Ok(false) => {},
                    Err(e) => {
                        self.metrics().record_store_error("delete");
                        warn!(key = %key, error = %e, "Cache delete failed");
                    },
                }
            }
        }

        let mut patterns = vec![self.keys().list_pattern()];
        patterns.extend(actions.iter().map(|a| self.keys().action_list_pattern(a)));

        match self.store().pattern_delete() {
            Some(deleter) => {
                for pattern in &patterns {
                    match deleter.delete_pattern(pattern).await {
                        Ok(count) => {
                            debug!(pattern = %pattern, count, "Cache entries invalidated by pattern");
                            result.deleted += count;
                        },
                        Err(e) => {
                            self.metrics().record_store_error("delete_pattern");
                            warn!(pattern = %pattern, error = %e, "Pattern invalidation failed");
                        },
                    }
                }
            },
            None => {
                let unsupported = ToolkitError::unsupported("delete_pattern");
                warn!(
                    store = self.store().name(),
                    namespace = self.keys().namespace(),
                    "{}; list entries expire with their TTL",
                    unsupported
                );
                result.broad_flush_skipped = true;
            },
        }

        result.patterns = patterns;
        self.metrics().record_invalidated(result.deleted);

        info!(
            namespace = self.keys().namespace(),
            entity_id = entity_id.unwrap_or("-"),
            deleted = result.deleted,
            "Cache invalidated"
        );

        result
    }
}
