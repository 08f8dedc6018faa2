//! Error types for Restkit.
//!
//! This module defines the error hierarchy shared by the cache and
//! throttle layers. All errors implement the standard
//! `std::error::Error` trait via `thiserror`.
//!
//! # Error Handling Philosophy
//!
//! - Setup problems (`Configuration`) fail fast and surface to the operator
//! - Per-request data problems (`NotFound`) surface as structured 4xx responses
//! - Store capability and connectivity problems are logged and swallowed by
//!   the cache and throttle layers, which then fail open
//!
//! # Example
//!
//! ```
//! use restkit_core::{Result, ToolkitError};
//!
//! fn find_todo(id: u64) -> Result<String> {
//!     if id == 0 {
//!         return Err(ToolkitError::not_found("Todo", "The requested Todo was not found."));
//!     }
//!     Ok(format!("todo {}", id))
//! }
//!
//! assert!(find_todo(0).unwrap_err().is_not_found());
//! ```

use thiserror::Error;

/// Main error type for Restkit operations.
#[derive(Debug, Error)]
pub enum ToolkitError {
    /// A required setting or attribute is missing or malformed.
    #[error("Improperly configured: {0}")]
    Configuration(String),

    /// An entity lookup returned no row.
    #[error("{detail}")]
    NotFound {
        /// Name of the resource that was looked up
        resource: String,
        /// Message shown to the client
        detail: String,
    },

    /// The cache store cannot perform the requested operation.
    #[error("Cache backend does not support '{operation}'")]
    CacheBackendUnsupported {
        /// Operation that was attempted (for example `delete_pattern`)
        operation: String,
    },

    /// The cache store failed (connectivity, serialization...).
    #[error("Store error: {0}")]
    Store(String),

    /// Client supplied an invalid value.
    #[error("Validation error for field '{field}': {message}")]
    Validation {
        /// Field that failed validation
        field: String,
        /// Description of the validation failure
        message: String,
    },
}

impl ToolkitError {
    // ============================================
    // Convenience constructors
    // ============================================

    /// Creates a Configuration error.
    ///
    /// # Example
    ///
    /// ```
    /// use restkit_core::ToolkitError;
    ///
    /// let error = ToolkitError::configuration("Queryset attribute is not set.");
    /// assert!(error.is_configuration());
    /// ```
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Creates a NotFound error.
    pub fn not_found(resource: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
            detail: detail.into(),
        }
    }

    /// Creates a CacheBackendUnsupported error.
    pub fn unsupported(operation: impl Into<String>) -> Self {
        Self::CacheBackendUnsupported {
            operation: operation.into(),
        }
    }

    /// Creates a Store error.
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store(message.into())
    }

    /// Creates a Validation error.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    // ============================================
    // Predicates
    // ============================================

    /// Returns true if this is a NotFound error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns true if this is a Configuration error.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    /// Returns true if callers should log and continue instead of failing
    /// the request.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::CacheBackendUnsupported { .. } | Self::Store(_))
    }
}

/// Result alias for Restkit operations.
pub type Result<T> = std::result::Result<T, ToolkitError>;
