//! Error types for the procwise-store crate.

use thiserror::Error;

/// Alias for `Result<T, StoreError>`.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in the session store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An exported session record could not be imported.
    #[error("session import failed: {reason}")]
    Import { reason: String },

    /// JSON serialization or deserialization failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
