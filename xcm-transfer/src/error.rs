//! Error types for transfer message construction

use crate::direction::{AssetKind, Direction};
use region_core::ErrorKind;
use thiserror::Error;

/// Result type for transfer operations
pub type Result<T> = std::result::Result<T, Error>;

/// Transfer construction errors
#[derive(Error, Debug)]
pub enum Error {
    /// No route exists for this direction and asset kind
    #[error("Unsupported transfer {direction} for {kind} assets")]
    UnsupportedDirection {
        /// Requested direction
        direction: Direction,
        /// Requested asset kind
        kind: AssetKind,
    },

    /// Fungible transfer of nothing
    #[error("Zero amount for transfer {0}")]
    ZeroAmount(Direction),

    /// Malformed location
    #[error("Invalid location: {0}")]
    InvalidLocation(String),

    /// Region model error
    #[error("Region error: {0}")]
    Region(#[from] region_core::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::UnsupportedDirection { .. }
            | Error::ZeroAmount(_)
            | Error::InvalidLocation(_) => ErrorKind::InvalidInput,
            Error::Region(e) => e.kind(),
            Error::Config(_) => ErrorKind::Config,
            Error::Io(_) | Error::Json(_) => ErrorKind::Internal,
        }
    }
}
