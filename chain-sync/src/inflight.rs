//! Per-region exclusion
//!
//! A region may have at most one transfer and at most one record retrieval in flight. Each
//! kind of work keeps its own [`InFlight`] set; a [`Claim`] holds a region until dropped.

use parking_lot::Mutex;
use region_core::RegionId;
use std::collections::HashSet;
use std::sync::Arc;

/// Regions currently claimed; clones share the same set
#[derive(Debug, Clone, Default)]
pub struct InFlight {
    regions: Arc<Mutex<HashSet<RegionId>>>,
}

impl InFlight {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `region`, or `None` if it is already claimed
    pub fn claim(&self, region: RegionId) -> Option<Claim> {
        if !self.regions.lock().insert(region) {
            return None;
        }
        Some(Claim {
            regions: Arc::clone(&self.regions),
            region,
        })
    }

    /// Whether `region` is claimed
    pub fn contains(&self, region: &RegionId) -> bool {
        self.regions.lock().contains(region)
    }

    /// Number of claimed regions
    pub fn len(&self) -> usize {
        self.regions.lock().len()
    }

    /// Whether nothing is claimed
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Holds a region in its [`InFlight`] set until dropped
#[derive(Debug)]
pub struct Claim {
    regions: Arc<Mutex<HashSet<RegionId>>>,
    region: RegionId,
}

impl Claim {
    /// Claimed region
    pub fn region(&self) -> RegionId {
        self.region
    }
}

impl Drop for Claim {
    fn drop(&mut self) {
        self.regions.lock().remove(&self.region);
    }
}
