//! Derived region metadata
//!
//! Metadata is recomputed on demand from a region snapshot and the caller's view of the
//! chains; it is never persisted as truth.

use crate::{
    region::Region,
    types::{BlockNumber, Hash, Percentage, TaskId},
};
use serde::{Deserialize, Serialize};

/// Where a region currently lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegionLocation {
    /// Held on the coretime chain
    CoretimeChain,
    /// Held on the market chain
    MarketChain,
    /// Held on the market chain and listed for sale
    ListedOnMarket,
}

impl RegionLocation {
    /// Whether the region's record lives on a chain other than the one holding it
    pub fn needs_remote_record(&self) -> bool {
        !matches!(self, RegionLocation::CoretimeChain)
    }
}

/// Availability of the region's authoritative record to its holder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordStatus {
    /// Record is usable
    Available,
    /// A remote request for the record is in flight
    Pending,
    /// Record is missing and no request is in flight
    Unavailable,
}

/// Caller-supplied chain view used to derive metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainContext {
    /// Where the region is held
    pub location: RegionLocation,
    /// Current relay-chain block number
    pub relay_block: BlockNumber,
    /// Relay blocks per timeslice
    pub timeslice_period: BlockNumber,
    /// Task assigned to the region, if any
    pub task_id: Option<TaskId>,
    /// Record status reported by the retrieval machine (ignored on the coretime chain)
    pub record_status: RecordStatus,
    /// Commitment of the in-flight record request
    pub request_commitment: Option<Hash>,
}

/// Region plus derived display metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionMetadata {
    /// Region snapshot
    pub region: Region,
    /// Where it lives
    pub location: RegionLocation,
    /// Fraction of the core occupied
    pub core_occupancy: Percentage,
    /// Fraction of the region's lifetime elapsed
    pub consumed: Percentage,
    /// Assigned task
    pub task_id: Option<TaskId>,
    /// Record availability
    pub status: RecordStatus,
    /// In-flight request commitment
    pub request_commitment: Option<Hash>,
}

/// Derive metadata for `region` under `ctx`.
///
/// Regions held on the coretime chain always have their record available. Elsewhere a
/// commitment is only reported while the request is pending.
pub fn region_metadata(region: &Region, ctx: &ChainContext) -> RegionMetadata {
    let status = if ctx.location.needs_remote_record() {
        ctx.record_status
    } else {
        RecordStatus::Available
    };

    let request_commitment = match status {
        RecordStatus::Pending => ctx.request_commitment,
        RecordStatus::Available | RecordStatus::Unavailable => None,
    };

    RegionMetadata {
        region: region.clone(),
        location: ctx.location,
        core_occupancy: region.occupancy(),
        consumed: region.consumed(ctx.relay_block, ctx.timeslice_period),
        task_id: ctx.task_id,
        status,
        request_commitment,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AccountId, CoreMask, RegionId};

    fn region() -> Region {
        let id = RegionId::new(100, 1, CoreMask::from_chunk(0, 39).unwrap()).unwrap();
        Region::new(id, 200, AccountId::new([2u8; 32]), None).unwrap()
    }

    fn ctx(location: RegionLocation, record_status: RecordStatus) -> ChainContext {
        ChainContext {
            location,
            relay_block: 150,
            timeslice_period: 1,
            task_id: Some(2000),
            record_status,
            request_commitment: Some(Hash::new([9u8; 32])),
        }
    }

    #[test]
    fn test_metrics() {
        let meta = region_metadata(&region(), &ctx(RegionLocation::MarketChain, RecordStatus::Available));
        assert_eq!(meta.core_occupancy.value(), 0.5);
        assert_eq!(meta.consumed.value(), 0.5);
        assert_eq!(meta.task_id, Some(2000));
    }

    #[test]
    fn test_coretime_chain_is_always_available() {
        let meta = region_metadata(&region(), &ctx(RegionLocation::CoretimeChain, RecordStatus::Unavailable));
        assert_eq!(meta.status, RecordStatus::Available);
        assert_eq!(meta.request_commitment, None);
    }

    #[test]
    fn test_commitment_only_while_pending() {
        let pending = region_metadata(&region(), &ctx(RegionLocation::ListedOnMarket, RecordStatus::Pending));
        assert_eq!(pending.status, RecordStatus::Pending);
        assert!(pending.request_commitment.is_some());

        let lost = region_metadata(&region(), &ctx(RegionLocation::MarketChain, RecordStatus::Unavailable));
        assert_eq!(lost.request_commitment, None);
    }
}
