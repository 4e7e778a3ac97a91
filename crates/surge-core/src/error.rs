//! Error types for surge
//!
//! Explicit error types with context, using thiserror.
//!
//! Business outcomes of a purchase attempt (already purchased, out of stock,
//! sale not active) are NOT errors; they are variants of
//! `PurchaseOutcome` in the server crate. Errors here are reserved for
//! invalid input, store outages, and protocol bugs.

use thiserror::Error;

/// Result type alias for surge operations
pub type Result<T> = std::result::Result<T, Error>;

/// Surge error types
#[derive(Error, Debug)]
pub enum Error {
    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Invalid user id: {reason}")]
    InvalidUserId { reason: String },

    // =========================================================================
    // Store Errors
    // =========================================================================
    #[error("Store unavailable: {reason}")]
    StoreUnavailable { reason: String },

    #[error("Wrong value type at key: {key}")]
    WrongType { key: String },

    /// The purchase script replied with a code this build does not know.
    /// Indicates a mismatch between script version and consumer.
    #[error("Unknown status code {code} from atomic script")]
    ScriptProtocol { code: i64 },

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    #[error("Invalid configuration: {field}, reason: {reason}")]
    InvalidConfiguration { field: String, reason: String },

    // =========================================================================
    // Internal Errors
    // =========================================================================
    #[error("Internal error: {reason}")]
    Internal { reason: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Create an invalid user id error
    pub fn invalid_user_id(reason: impl Into<String>) -> Self {
        Self::InvalidUserId {
            reason: reason.into(),
        }
    }

    /// Create a store unavailable error
    pub fn store_unavailable(reason: impl Into<String>) -> Self {
        Self::StoreUnavailable {
            reason: reason.into(),
        }
    }

    /// Create an invalid configuration error
    pub fn invalid_configuration(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create an internal error
    pub fn internal(reason: impl Into<String>) -> Self {
        Self::Internal {
            reason: reason.into(),
        }
    }

    /// Check if this error is retriable by the caller
    ///
    /// Only transport-level store failures are retriable, and only by
    /// re-querying user status first: retrying a purchase blindly after an
    /// indeterminate commit would convert a success into a duplicate answer.
    pub fn is_retriable(&self) -> bool {
        matches!(self, Self::StoreUnavailable { .. })
    }
}
