//! Coretime Region Core
//!
//! Value types and derived metrics for Coretime Regions: bulk-purchased execution time on a
//! core, identified by a begin timeslice, a core index and an 80-bit occupancy mask.
//!
//! # Identifiers
//!
//! - **Structured**: [`RegionId`] `{ begin, core, mask }`
//! - **Packed**: a single `u128` (`begin` in the top 32 bits, `core` in the next 16, `mask` in
//!   the low 80), used wherever only a scalar non-fungible index is understood

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]
//!
//! # Invariants
//!
//! - `begin <= end` for every region
//! - A region's mask is never void
//! - `decode(encode(id)) == id`
//! - Percentages are always within `[0, 1]`

#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod error;
pub mod mask;
pub mod metadata;
pub mod region;
pub mod store;
pub mod types;

// Re-exports
pub use error::{Error, ErrorKind, Result};
pub use mask::CoreMask;
pub use metadata::{region_metadata, ChainContext, RecordStatus, RegionLocation, RegionMetadata};
pub use region::{Region, RegionId, RegionRecord, RenewalQuote};
pub use types::{
    AccountId, Balance, BlockNumber, ChainId, CoreIndex, Hash, Percentage, TaskId, Timeslice,
    Timestamp,
};

/// Number of bits in a core mask (one per regularity part of a core)
pub const CORE_MASK_BITS: u32 = 80;

/// Relay-chain blocks per timeslice on production networks
pub const DEFAULT_TIMESLICE_PERIOD: BlockNumber = 80;
