//! Per-cycle cache of sale boundaries
//!
//! Boundaries are read-mostly: they change only when a new cycle starts or the broker
//! configuration is updated. The cache is keyed by every input the derivation reads, so any
//! such change invalidates it.

use crate::{
    phase::SaleBoundaries,
    types::{SaleConfig, SaleInfo},
    Result,
};
use region_core::{BlockNumber, Timeslice};
use tracing::debug;

/// Inputs that determine a cycle's boundaries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CycleKey {
    sale_start: BlockNumber,
    leadin_length: BlockNumber,
    region_begin: Timeslice,
    interlude_length: BlockNumber,
    region_length: Timeslice,
    blocks_per_timeslice: BlockNumber,
}

impl CycleKey {
    fn new(info: &SaleInfo, config: &SaleConfig, blocks_per_timeslice: BlockNumber) -> Self {
        Self {
            sale_start: info.sale_start,
            leadin_length: info.leadin_length,
            region_begin: info.region_begin,
            interlude_length: config.interlude_length,
            region_length: config.region_length,
            blocks_per_timeslice,
        }
    }
}

/// Boundaries of the most recently seen cycle
#[derive(Debug, Default)]
pub struct BoundaryCache {
    cached: Option<(CycleKey, SaleBoundaries)>,
    recomputations: u64,
}

impl BoundaryCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Boundaries for `info`, recomputed only when the cycle or configuration changed
    pub fn get_or_derive(
        &mut self,
        info: &SaleInfo,
        config: &SaleConfig,
        blocks_per_timeslice: BlockNumber,
    ) -> Result<SaleBoundaries> {
        let key = CycleKey::new(info, config, blocks_per_timeslice);

        if let Some((cached_key, boundaries)) = &self.cached {
            if *cached_key == key {
                return Ok(*boundaries);
            }
            debug!(
                "Sale cycle changed (start {} -> {}), recomputing boundaries",
                cached_key.sale_start, key.sale_start
            );
        }

        let boundaries = SaleBoundaries::derive(info, config, blocks_per_timeslice)?;
        self.cached = Some((key, boundaries));
        self.recomputations += 1;
        Ok(boundaries)
    }

    /// Cached boundaries, if any
    pub fn current(&self) -> Option<SaleBoundaries> {
        self.cached.map(|(_, b)| b)
    }

    /// Drop the cached cycle
    pub fn invalidate(&mut self) {
        self.cached = None;
    }

    /// Number of derivations performed (for diagnostics)
    pub fn recomputations(&self) -> u64 {
        self.recomputations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn info(sale_start: BlockNumber) -> SaleInfo {
        SaleInfo {
            sale_start,
            leadin_length: 10,
            floor_price: 100,
            region_begin: 1,
            region_end: 2,
            first_core: 0,
            ideal_cores_sold: 1,
            cores_offered: 2,
            cores_sold: 0,
            sellout_price: None,
            previous_sellout_price: None,
        }
    }

    fn config() -> SaleConfig {
        SaleConfig {
            interlude_length: 5,
            leadin_length: 10,
            region_length: 2,
            renewal_bump: Decimal::ZERO,
        }
    }

    #[test]
    fn test_cache_hits_within_cycle() {
        let mut cache = BoundaryCache::new();
        let mut sale = info(100);
        cache.get_or_derive(&sale, &config(), 40).unwrap();

        // Purchases do not change the boundaries
        sale.cores_sold = 1;
        cache.get_or_derive(&sale, &config(), 40).unwrap();
        assert_eq!(cache.recomputations(), 1);
    }

    #[test]
    fn test_new_cycle_invalidates() {
        let mut cache = BoundaryCache::new();
        let first = cache.get_or_derive(&info(100), &config(), 40).unwrap();
        let second = cache.get_or_derive(&info(180), &config(), 40).unwrap();
        assert_ne!(first, second);
        assert_eq!(cache.recomputations(), 2);
        assert_eq!(cache.current(), Some(second));
    }

    #[test]
    fn test_config_change_invalidates() {
        let mut cache = BoundaryCache::new();
        cache.get_or_derive(&info(100), &config(), 40).unwrap();
        let mut changed = config();
        changed.interlude_length = 7;
        let b = cache.get_or_derive(&info(100), &changed, 40).unwrap();
        assert_eq!(b.interlude_end, 107);

        cache.invalidate();
        assert!(cache.current().is_none());
    }
}
