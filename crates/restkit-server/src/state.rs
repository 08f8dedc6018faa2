//! Application state.

use std::collections::BTreeMap;
use std::sync::Arc;

use restkit_core::{Clock, Result, SystemClock};
use restkit_store::{CacheStore, MokaStore};

use crate::auth::{Authenticator, StaticTokens};
use crate::cache::{CacheConfig, CacheOrchestrator};
use crate::config::{Settings, SettingsHandle};
use crate::throttle::{RateWindowTracker, ThrottleInspector, ThrottleSet};
use crate::todos::{CACHED_ACTIONS, TodoRepository, TodoResource};
use crate::viewset::{CachedViewSet, Resource};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    settings: SettingsHandle,
    store: Arc<dyn CacheStore>,
    authenticator: Arc<dyn Authenticator>,
    inspector: Arc<ThrottleInspector>,
    default_throttles: ThrottleSet,
    view_throttles: Arc<BTreeMap<String, ThrottleSet>>,
    todos: Arc<CachedViewSet<TodoResource>>,
}

impl AppState {
    /// Builds the state with an in-memory store and the system clock.
    pub fn new(settings: SettingsHandle) -> Result<Self> {
        let current = settings.current();
        let store: Arc<dyn CacheStore> = Arc::new(MokaStore::new(current.cache.max_capacity));
        Self::with_parts(settings, store, Arc::new(SystemClock))
    }

    /// Builds the state around an explicit store and clock.
    ///
    /// Fails when a throttle rate or class name in the settings is invalid.
    pub fn with_parts(
        settings: SettingsHandle,
        store: Arc<dyn CacheStore>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let current = settings.current();

        let tracker = RateWindowTracker::new(Arc::clone(&store), Arc::clone(&clock));
        let inspector = Arc::new(ThrottleInspector::new(tracker, &current.throttle)?);

        let authenticator: Arc<dyn Authenticator> = Arc::new(StaticTokens::new(&current.auth.tokens));

        let default_throttles = ThrottleSet::from_class_names(&current.throttle.default_classes)?;
        let view_throttles = current
            .throttle
            .views
            .iter()
            .map(|(view, classes)| Ok((view.clone(), ThrottleSet::from_class_names(classes)?)))
            .collect::<Result<BTreeMap<_, _>>>()?;

        let repository = Arc::new(TodoRepository::new(clock));
        let resource = TodoResource::new(repository, current.pagination.clone());
        let cache = CacheOrchestrator::new(Arc::clone(&store), resource.basename(), &cache_config(&current));
        let todos = CachedViewSet::new(resource, cache).with_cached_actions(CACHED_ACTIONS.iter().copied());

        tracing::info!(
            store = store.name(),
            ttl_seconds = current.cache.ttl_seconds,
            rates = current.throttle.rates.len(),
            tokens = current.auth.tokens.len(),
            "Application state initialized"
        );

        Ok(Self {
            settings,
            store,
            authenticator,
            inspector,
            default_throttles,
            view_throttles: Arc::new(view_throttles),
            todos: Arc::new(todos),
        })
    }

    /// Convenience constructor from plain settings.
    pub fn from_settings(settings: Settings) -> Result<Self> {
        Self::new(SettingsHandle::new(settings))
    }

    pub fn settings(&self) -> Arc<Settings> {
        self.settings.current()
    }

    pub fn settings_handle(&self) -> &SettingsHandle {
        &self.settings
    }

    pub fn store(&self) -> &dyn CacheStore {
        self.store.as_ref()
    }

    pub fn authenticator(&self) -> Arc<dyn Authenticator> {
        Arc::clone(&self.authenticator)
    }

    pub fn inspector(&self) -> Arc<ThrottleInspector> {
        Arc::clone(&self.inspector)
    }

    /// Throttles configured for a view, falling back to the defaults.
    pub fn throttles_for(&self, view: &str) -> ThrottleSet {
        self.view_throttles
            .get(view)
            .unwrap_or(&self.default_throttles)
            .clone()
    }

    pub fn todos(&self) -> &CachedViewSet<TodoResource> {
        &self.todos
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("store", &self.store.name())
            .field("authenticator", &self.authenticator)
            .field("inspector", &self.inspector)
            .finish_non_exhaustive()
    }
}

fn cache_config(settings: &Settings) -> CacheConfig {
    CacheConfig {
        ttl_seconds: settings.cache.ttl_seconds,
        max_capacity: settings.cache.max_capacity,
    }
}
