//! Error types.

use std::fmt;

use thiserror::Error;

/// Which half of a persist failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PersistPhase {
    /// Writing the catalog entry.
    Catalog,
    /// Creating the data namespace or writing the rows.
    Data,
}

impl fmt::Display for PersistPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Catalog => f.write_str("catalog registration"),
            Self::Data => f.write_str("data write"),
        }
    }
}

/// Coarse classification of an [`Error`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caller bug: bad arity, mismatched batch, unknown column, reserved name.
    InvalidArgument,
    /// Transaction open/commit or I/O failure in the backend.
    Storage,
    /// The namespace or collection does not exist.
    NotFound,
    /// Stored bytes could not be decoded.
    Corruption,
}

/// Storage error type.
#[derive(Debug, Error)]
pub enum Error {
    /// LMDB error.
    #[error("database error: {0}")]
    Database(#[from] heed::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Namespace has not been created.
    #[error("namespace not found: {0}")]
    NamespaceNotFound(String),

    /// Collection has no catalog entry.
    #[error("collection not found: {0}")]
    CollectionNotFound(String),

    /// Precondition violated by the caller.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Stored bytes are malformed.
    #[error("data corruption: {0}")]
    Corruption(String),

    /// A persist failed in one of its two phases.
    #[error("persisting {collection} failed during {phase}: {source}")]
    Persist {
        collection: String,
        phase: PersistPhase,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Classify this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Database(_) | Self::Io(_) => ErrorKind::Storage,
            Self::NamespaceNotFound(_) | Self::CollectionNotFound(_) => ErrorKind::NotFound,
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::Corruption(_) => ErrorKind::Corruption,
            Self::Persist { source, .. } => source.kind(),
        }
    }

    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub(crate) fn corrupt(msg: impl Into<String>) -> Self {
        Self::Corruption(msg.into())
    }
}

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, Error>;
