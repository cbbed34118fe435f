//! Error types for the region model

use thiserror::Error;

/// Result type for region operations
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification shared by every crate in the workspace.
///
/// `InvalidInput` and `NotFound` are caller errors and are never retried automatically.
/// `RemoteFailure` is the only retryable kind. `Timeout` is an expected terminal outcome of
/// a remote request and is kept apart from `RemoteFailure`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed caller input
    InvalidInput,
    /// A record, commitment or quote does not exist
    NotFound,
    /// A chain adapter reported a submission or inclusion failure
    RemoteFailure,
    /// A remote request exceeded its timeout without resolution
    Timeout,
    /// Arithmetic exceeded the representable range
    Overflow,
    /// Configuration could not be loaded
    Config,
    /// Anything else (serialization, IO)
    Internal,
}

impl ErrorKind {
    /// Whether a caller may retry the same operation unchanged
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorKind::RemoteFailure)
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::NotFound => "not_found",
            ErrorKind::RemoteFailure => "remote_failure",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Overflow => "overflow",
            ErrorKind::Config => "config",
            ErrorKind::Internal => "internal",
        };
        f.write_str(name)
    }
}

/// Region model errors
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid mask operation (bad chunk bounds, malformed binary string, bad interlace pivot)
    #[error("Invalid mask: {0}")]
    InvalidMask(String),

    /// Invalid region identifier (packed id out of range, void mask)
    #[error("Invalid region id: {0}")]
    InvalidRegionId(String),

    /// Region violates `begin <= end`
    #[error("Invalid region: {0}")]
    InvalidRegion(String),

    /// Malformed account or hash encoding
    #[error("Invalid encoding: {0}")]
    InvalidEncoding(String),

    /// Record not found
    #[error("Record not found: {0}")]
    NotFound(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    /// JSON error (key-value store payloads)
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidMask(_)
            | Error::InvalidRegionId(_)
            | Error::InvalidRegion(_)
            | Error::InvalidEncoding(_) => ErrorKind::InvalidInput,
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::Serialization(_) | Error::Json(_) => ErrorKind::Internal,
        }
    }
}
