//! Shared error type across metrix crates.

use thiserror::Error;

/// Stable error categories (used in logs and by the HTTP layer).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Bad metric name, type, or value. User-fixable.
    Validation,
    /// No such metric.
    NotFound,
    /// Malformed or unsupported request body.
    Encoding,
    /// The repository backend refused an operation.
    Storage,
    /// Snapshot file I/O or (de)serialization failed.
    Persistence,
}

impl ErrorClass {
    /// String representation used in logs and test vectors.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorClass::Validation => "VALIDATION",
            ErrorClass::NotFound => "NOT_FOUND",
            ErrorClass::Encoding => "ENCODING",
            ErrorClass::Storage => "STORAGE",
            ErrorClass::Persistence => "PERSISTENCE",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, MetrixError>;

/// Unified error type used by core and server.
#[derive(Debug, Error)]
pub enum MetrixError {
    #[error("metric name is required")]
    MissingName,
    #[error("invalid metric type: {0}")]
    InvalidKind(String),
    #[error("invalid {kind} value: {raw}")]
    InvalidValue { kind: &'static str, raw: String },
    #[error("metric not found: {0}")]
    NotFound(String),
    #[error("malformed request body: {0}")]
    Encoding(String),
    #[error("unsupported media type")]
    UnsupportedMediaType,
    #[error("storage: {0}")]
    Storage(String),
    #[error("persistence: {0}")]
    Persistence(String),
    #[error("config: {0}")]
    Config(String),
}

impl MetrixError {
    /// Map an error to its stable category.
    pub fn class(&self) -> ErrorClass {
        match self {
            MetrixError::MissingName
            | MetrixError::InvalidKind(_)
            | MetrixError::InvalidValue { .. }
            | MetrixError::Config(_) => ErrorClass::Validation,
            MetrixError::NotFound(_) => ErrorClass::NotFound,
            MetrixError::Encoding(_) | MetrixError::UnsupportedMediaType => ErrorClass::Encoding,
            MetrixError::Storage(_) => ErrorClass::Storage,
            MetrixError::Persistence(_) => ErrorClass::Persistence,
        }
    }

    /// Whether the error is the server's fault rather than the caller's.
    pub fn is_server_fault(&self) -> bool {
        matches!(self.class(), ErrorClass::Storage | ErrorClass::Persistence)
    }
}
