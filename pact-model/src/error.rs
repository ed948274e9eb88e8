//! Model error types.

use thiserror::Error;

/// Errors from pact document serialization and persistence.
#[derive(Error, Debug)]
pub enum ModelError {
    /// Filesystem error while writing a pact file
    #[error("I/O error writing pact file: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
