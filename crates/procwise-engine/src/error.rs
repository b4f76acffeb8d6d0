//! Error types for the procwise-engine crate.
//!
//! These never cross the `handle_turn` boundary: collaborator failures are
//! caught at the call site and turned into fallback responses.

use thiserror::Error;

/// Alias for `Result<T, EngineError>`.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors raised by engine collaborators.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The answer generator failed or returned unusable output.
    #[error("answer generator failed: {0}")]
    Generator(String),

    /// A data module lookup failed.
    #[error("data module query failed: {0}")]
    Data(String),

    /// JSON handling failed while reading workflow scratch data.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
