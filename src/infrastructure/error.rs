//! Infrastructure-level errors (store failures)

use std::path::PathBuf;

use thiserror::Error;

use crate::domain::UnitId;

/// Store errors are propagated unchanged to the caller; nothing here is retried.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid data file {path}: {source}")]
    Serialization {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("store lock poisoned")]
    Poisoned,

    #[error("business unit already exists: {0}")]
    DuplicateUnit(UnitId),

    #[error("business unit not in store: {0}")]
    MissingUnit(UnitId),
}

impl StoreError {
    /// Create an I/O error with context.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
