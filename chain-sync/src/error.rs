//! Error types for chain synchronization

use crate::adapter::TxStep;
use region_core::{ChainId, ErrorKind, RegionId};
use thiserror::Error;

/// Result type for synchronization operations
pub type Result<T> = std::result::Result<T, Error>;

/// Chain synchronization errors
#[derive(Debug, Error)]
pub enum Error {
    /// Region model error
    #[error("Region error: {0}")]
    Region(#[from] region_core::Error),

    /// Sale engine error
    #[error("Sale error: {0}")]
    Sale(#[from] sale_engine::Error),

    /// Transfer construction error
    #[error("Transfer error: {0}")]
    Transfer(#[from] xcm_transfer::Error),

    /// Submission failed after reaching `step`
    #[error("{extrinsic} on {chain} failed after {step}: {reason}")]
    RemoteFailure {
        /// Chain the extrinsic was submitted to
        chain: ChainId,
        /// Extrinsic name
        extrinsic: String,
        /// Last lifecycle step reached
        step: TxStep,
        /// Failure reported by the chain or adapter
        reason: String,
    },

    /// A remote operation did not resolve in time
    #[error("Timeout after {attempts} attempts: {operation}")]
    Timeout {
        /// Attempts made
        attempts: u32,
        /// Operation
        operation: String,
    },

    /// Request, commitment or record not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// A record request for this region is already in flight
    #[error("Record request already in flight for region {0}")]
    RequestInFlight(RegionId),

    /// A transfer of this region is already in flight
    #[error("Transfer already in flight for region {0}")]
    TransferInFlight(RegionId),

    /// Operation not valid in the current retrieval state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Region(e) => e.kind(),
            Error::Sale(e) => e.kind(),
            Error::Transfer(e) => e.kind(),
            Error::RemoteFailure { .. } => ErrorKind::RemoteFailure,
            Error::Timeout { .. } => ErrorKind::Timeout,
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::RequestInFlight(_) | Error::TransferInFlight(_) | Error::InvalidState(_) => {
                ErrorKind::InvalidInput
            }
            Error::Io(_) => ErrorKind::Internal,
            Error::Config(_) => ErrorKind::Config,
        }
    }

    /// Whether the same operation may be retried unchanged
    pub fn is_retryable(&self) -> bool {
        self.kind().is_retryable()
    }
}
