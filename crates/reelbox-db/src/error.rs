//! `StorageError` - key-value store failures.

use thiserror::Error;

/// Error returned by key-value store operations.
#[derive(Debug, Error)]
#[allow(clippy::module_name_repetitions)]
pub enum StorageError {
    /// The database rejected or failed an operation.
    #[error("{context}: {source}")]
    Backend {
        /// What was being attempted.
        context: String,
        /// Underlying database error.
        #[source]
        source: rusqlite::Error,
    },

    /// A value could not be serialized before writing.
    #[error("failed to encode value for key {key}: {source}")]
    Encode {
        /// Target key.
        key: String,
        /// Serialization failure.
        #[source]
        source: serde_json::Error,
    },

    /// The value kept changing underneath a read-modify-write.
    #[error("value for key {key} kept changing concurrently")]
    Conflict {
        /// Contended key.
        key: String,
    },

    /// The store cannot be reached.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

impl StorageError {
    /// Wraps a database error with a description of the attempted operation.
    pub fn backend(context: impl Into<String>, source: rusqlite::Error) -> Self {
        Self::Backend {
            context: context.into(),
            source,
        }
    }
}
