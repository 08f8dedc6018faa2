//! Cached resource view sets.
//!
//! A [`Resource`] holds the business logic of an endpoint family; a
//! [`CachedViewSet`] wraps it so reads go through the response cache and
//! writes invalidate it.

use std::future::Future;

use async_trait::async_trait;
use axum::Json;
use serde::Serialize;
use serde_json::Value;

use crate::cache::{ActionKind, CacheOrchestrator};
use crate::error::AppError;
use crate::extractors::query::QueryParams;

/// CRUD operations of a resource, returning JSON payloads.
#[async_trait]
pub trait Resource: Send + Sync + 'static {
    /// Namespace of the resource's cache keys.
    fn basename(&self) -> &str;

    /// Canonical form of an entity id, used for detail keys and
    /// invalidation. Ids naming the same entity must map to the same
    /// string.
    fn canonical_id(&self, id: &str) -> Result<String, AppError> {
        Ok(id.to_string())
    }

    async fn list(&self, query: &QueryParams) -> Result<Value, AppError>;

    async fn retrieve(&self, id: &str) -> Result<Value, AppError>;

    async fn create(&self, payload: Value) -> Result<Value, AppError>;

    async fn update(&self, id: &str, payload: Value) -> Result<Value, AppError>;

    async fn destroy(&self, id: &str) -> Result<(), AppError>;
}

/// Payload types a cached action may return.
pub trait IntoCachedData {
    fn into_cached_data(self) -> Result<Value, AppError>;
}

impl IntoCachedData for Value {
    fn into_cached_data(self) -> Result<Value, AppError> {
        Ok(self)
    }
}

impl<T: Serialize> IntoCachedData for Json<T> {
    fn into_cached_data(self) -> Result<Value, AppError> {
        serde_json::to_value(self.0).map_err(|e| AppError::Internal(e.to_string()))
    }
}

/// Wraps a [`Resource`] with response caching.
///
/// Each read performs at most one store read and, on a miss, one write.
/// Every mutation invalidates the detail entry of the touched id, the list
/// entries, and the entries of the declared cached actions.
pub struct CachedViewSet<R> {
    resource: R,
    cache: CacheOrchestrator,
    cached_actions: Vec<String>,
}

impl<R: Resource> CachedViewSet<R> {
    pub fn new(resource: R, cache: CacheOrchestrator) -> Self {
        Self {
            resource,
            cache,
            cached_actions: Vec::new(),
        }
    }

    /// Declares the custom actions whose entries mutations must flush.
    pub fn with_cached_actions<I, S>(mut self, actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cached_actions = actions.into_iter().map(Into::into).collect();
        self
    }

    pub fn resource(&self) -> &R {
        &self.resource
    }

    pub fn cache(&self) -> &CacheOrchestrator {
        &self.cache
    }

    pub fn cached_actions(&self) -> &[String] {
        &self.cached_actions
    }

    pub async fn list(&self, query: &QueryParams) -> Result<Value, AppError> {
        match self.cache.keys().list(query) {
            Some(key) => {
                self.cache
                    .get_or_set(&key, || self.resource.list(query), None)
                    .await
            },
            None => self.resource.list(query).await,
        }
    }

    pub async fn retrieve(&self, id: &str) -> Result<Value, AppError> {
        let id = self.resource.canonical_id(id)?;
        match self.cache.keys().detail(&id) {
            Some(key) => {
                self.cache
                    .get_or_set(&key, || self.resource.retrieve(&id), None)
                    .await
            },
            None => self.resource.retrieve(&id).await,
        }
    }

    pub async fn create(&self, payload: Value) -> Result<Value, AppError> {
        self.mutation(None, || self.resource.create(payload)).await
    }

    pub async fn update(&self, id: &str, payload: Value) -> Result<Value, AppError> {
        self.mutation(Some(id), || self.resource.update(id, payload))
            .await
    }

    pub async fn destroy(&self, id: &str) -> Result<(), AppError> {
        self.mutation(Some(id), || self.resource.destroy(id)).await
    }

    /// Runs a write and, if it succeeds, invalidates the cache entries of
    /// the canonical `entity_id`.
    pub async fn mutation<F, Fut, T>(&self, entity_id: Option<&str>, run: F) -> Result<T, AppError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, AppError>>,
    {
        let entity_id = entity_id
            .map(|id| self.resource.canonical_id(id))
            .transpose()?;

        let value = run().await?;
        self.cache
            .invalidate(entity_id.as_deref(), &self.cached_actions)
            .await;
        Ok(value)
    }

    /// Caches the result of a custom action.
    ///
    /// With `detail_id` the entry is keyed by the id; otherwise by the
    /// query parameters.
    pub async fn cached_action<F, Fut, T>(
        &self,
        name: &str,
        detail_id: Option<&str>,
        query: &QueryParams,
        run: F,
    ) -> Result<Value, AppError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, AppError>>,
        T: IntoCachedData,
    {
        let detail_id = detail_id
            .map(|id| self.resource.canonical_id(id))
            .transpose()?;
        let kind = match detail_id {
            Some(_) => ActionKind::CustomDetail,
            None => ActionKind::CustomList,
        };

        match self
            .cache
            .keys()
            .build(kind, detail_id.as_deref(), Some(name), Some(query))
        {
            Some(key) => {
                self.cache
                    .get_or_set(&key, move || async move { run().await?.into_cached_data() }, None)
                    .await
            },
            None => run().await?.into_cached_data(),
        }
    }
}
