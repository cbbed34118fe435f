//! Error types for the sale engine

use region_core::ErrorKind;
use thiserror::Error;

/// Result type for sale operations
pub type Result<T> = std::result::Result<T, Error>;

/// Sale engine errors
#[derive(Error, Debug)]
pub enum Error {
    /// Region model error
    #[error("Region error: {0}")]
    Region(#[from] region_core::Error),

    /// Sale info inconsistent with the sale configuration
    #[error("Invalid sale: {0}")]
    InvalidSale(String),

    /// Purchases are not possible in the current phase
    #[error("Not for sale: {0}")]
    NotForSale(String),

    /// No cores left at a defined price
    #[error("Sold out: {0}")]
    SoldOut(String),

    /// No renewal quote exists for the core
    #[error("Renewal quote not found: {0}")]
    QuoteNotFound(String),

    /// Price arithmetic exceeded the balance range
    #[error("Price overflow: {0}")]
    Overflow(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
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
            Error::InvalidSale(_) | Error::NotForSale(_) | Error::SoldOut(_) => {
                ErrorKind::InvalidInput
            }
            Error::QuoteNotFound(_) => ErrorKind::NotFound,
            Error::Overflow(_) => ErrorKind::Overflow,
            Error::Config(_) => ErrorKind::Config,
            Error::Io(_) => ErrorKind::Internal,
        }
    }
}
