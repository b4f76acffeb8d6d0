//! Error types for the procwise-catalog crate.

use thiserror::Error;

/// Alias for `Result<T, CatalogError>`.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Errors that can occur while loading or querying the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog file could not be read.
    #[error("failed to read catalog file `{path}`: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The catalog file is not valid JSON or has the wrong shape.
    #[error("failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),

    /// A procedure definition violates a structural invariant.
    #[error("invalid procedure `{procedure_id}`: {reason}")]
    InvalidProcedure {
        procedure_id: String,
        reason: String,
    },
}
