//! Error taxonomy shared by the store, ingestion and analytics.

use thiserror::Error;

/// Errors surfaced by Hyphae operations.
///
/// An empty result is never an error: queries over a valid repository that
/// match nothing return an empty list.
#[derive(Debug, Error)]
pub enum HyphaeError {
    /// A repository or named developer does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Malformed repository identifier, commit fact, or query argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The store could not be reached (lock poisoned by a panicking writer).
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    /// A natural-key invariant would be broken (author change, cross-repository commit).
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed JSON in {location}: {source}")]
    Json {
        location: String,
        #[source]
        source: serde_json::Error,
    },
}

impl HyphaeError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        HyphaeError::NotFound(msg.into())
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        HyphaeError::InvalidArgument(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        HyphaeError::InvariantViolation(msg.into())
    }

    /// Short machine-readable kind, used by the bindings for status mapping.
    pub fn kind(&self) -> &'static str {
        match self {
            HyphaeError::NotFound(_) => "not_found",
            HyphaeError::InvalidArgument(_) | HyphaeError::Json { .. } => "invalid_argument",
            HyphaeError::StorageUnavailable(_) => "storage_unavailable",
            HyphaeError::Io { .. } => "io",
            HyphaeError::InvariantViolation(_) => "invariant_violation",
        }
    }
}

pub type Result<T> = std::result::Result<T, HyphaeError>;
