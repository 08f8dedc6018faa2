//! Error types for cache stores.

use restkit_core::ToolkitError;

/// Errors that can occur when talking to a cache store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The store is not reachable.
    #[error("store unavailable: {reason}")]
    Unavailable { reason: String },

    /// A glob pattern could not be compiled.
    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// The store does not implement the requested operation.
    #[error("operation not supported by store: {operation}")]
    Unsupported { operation: String },

    /// A stored value could not be decoded.
    #[error("corrupt entry under '{key}': {reason}")]
    Corrupt { key: String, reason: String },
}

impl StoreError {
    /// Creates a new unavailable error.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }

    /// Creates a new corrupt-entry error.
    pub fn corrupt(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Corrupt {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Returns true if this is a transient error that might succeed on retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }
}

impl From<StoreError> for ToolkitError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unsupported { operation } => ToolkitError::unsupported(operation),
            other => ToolkitError::store(other.to_string()),
        }
    }
}
