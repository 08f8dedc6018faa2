//! Store doubles shared by unit tests.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use restkit_store::{CacheStore, StoreError};
use serde_json::Value;

/// Store without pattern delete and without expiry.
#[derive(Default)]
pub(crate) struct PlainStore {
    entries: Mutex<HashMap<String, Value>>,
}

#[async_trait]
impl CacheStore for PlainStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.entries.lock().get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value, _ttl: Duration) -> Result<(), StoreError> {
        self.entries.lock().insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.entries.lock().remove(key).is_some())
    }

    fn name(&self) -> &str {
        "plain"
    }
}

/// Store whose every operation fails.
pub(crate) struct FailingStore;

#[async_trait]
impl CacheStore for FailingStore {
    async fn get(&self, _key: &str) -> Result<Option<Value>, StoreError> {
        Err(StoreError::unavailable("connection refused"))
    }

    async fn set(&self, _key: &str, _value: Value, _ttl: Duration) -> Result<(), StoreError> {
        Err(StoreError::unavailable("connection refused"))
    }

    async fn delete(&self, _key: &str) -> Result<bool, StoreError> {
        Err(StoreError::unavailable("connection refused"))
    }

    fn name(&self) -> &str {
        "failing"
    }
}
