//! Bulk sale and renewal views over the coretime chain
//!
//! Reads the sale and its configuration through the [`ChainAdapter`] and keeps the derived
//! boundaries in a [`BoundaryCache`], so they are recomputed only when a new cycle starts or
//! the configuration changes.

use crate::{adapter::ChainAdapter, Result};
use region_core::{Balance, BlockNumber, ChainId, CoreIndex};
use sale_engine::{renewal_price_from_quote, BoundaryCache, PriceEngine, SaleState};
use std::sync::Arc;
use tracing::debug;

/// Sale prices as seen from the coretime chain
pub struct SaleTracker {
    adapter: Arc<dyn ChainAdapter>,
    cache: BoundaryCache,
    engine: PriceEngine,
    blocks_per_timeslice: BlockNumber,
}

impl std::fmt::Debug for SaleTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SaleTracker")
            .field("cache", &self.cache)
            .field("blocks_per_timeslice", &self.blocks_per_timeslice)
            .finish()
    }
}

impl SaleTracker {
    /// Tracker pricing with the curve and timing from `config`
    pub fn new(adapter: Arc<dyn ChainAdapter>, config: &sale_engine::Config) -> Result<Self> {
        Ok(Self {
            adapter,
            cache: BoundaryCache::new(),
            engine: PriceEngine::from_config(config)?,
            blocks_per_timeslice: config.timing.blocks_per_timeslice,
        })
    }

    /// Pricing engine
    pub fn engine(&self) -> &PriceEngine {
        &self.engine
    }

    /// Boundary derivations performed so far
    pub fn recomputations(&self) -> u64 {
        self.cache.recomputations()
    }

    /// Fetch the current sale and its boundaries
    pub async fn refresh(&mut self) -> Result<SaleState> {
        let info = self.adapter.sale_info().await?;
        let config = self.adapter.sale_config().await?;
        let boundaries = self
            .cache
            .get_or_derive(&info, &config, self.blocks_per_timeslice)?;
        Ok(SaleState::new(info, boundaries)?)
    }

    /// Price of a core at the coretime chain's head, `None` once the sale has ended
    pub async fn current_price(&mut self) -> Result<Option<Balance>> {
        let sale = self.refresh().await?;
        let now = self.adapter.block_height(ChainId::Coretime).await?;
        let price = self
            .engine
            .current_price(sale.info(), sale.boundaries(), now)?;
        debug!("Sale price at block {}: {:?}", now, price);
        Ok(price)
    }

    /// Renewal price of `core` after `missed_cycles` missed renewals.
    ///
    /// Fails with a not-found error when the chain holds no renewal for the core.
    pub async fn renewal_price(&self, core: CoreIndex, missed_cycles: u32) -> Result<Balance> {
        let quote = self.adapter.renewal_quote(core).await?;
        let config = self.adapter.sale_config().await?;
        Ok(renewal_price_from_quote(
            core,
            quote.as_ref(),
            config.renewal_bump,
            missed_cycles,
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryAdapter;
    use region_core::{CoreMask, ErrorKind, RenewalQuote};
    use rust_decimal::Decimal;
    use sale_engine::{SaleConfig, SaleInfo};

    fn info() -> SaleInfo {
        SaleInfo {
            sale_start: 1_000,
            leadin_length: 100,
            floor_price: 1_000,
            region_begin: 50,
            region_end: 60,
            first_core: 0,
            ideal_cores_sold: 2,
            cores_offered: 4,
            cores_sold: 0,
            sellout_price: None,
            previous_sellout_price: None,
        }
    }

    fn sale_config() -> SaleConfig {
        SaleConfig {
            interlude_length: 20,
            leadin_length: 100,
            region_length: 10,
            renewal_bump: Decimal::new(10, 2),
        }
    }

    fn tracker(adapter: &Arc<InMemoryAdapter>) -> SaleTracker {
        SaleTracker::new(adapter.clone(), &sale_engine::Config::default()).unwrap()
    }

    #[tokio::test]
    async fn test_renewal_priced_from_chain_quote() {
        let adapter = Arc::new(InMemoryAdapter::default());
        adapter.set_sale(info(), sale_config());
        adapter.set_renewal_quote(
            3,
            RenewalQuote {
                price: 1_000,
                mask: CoreMask::complete(),
                task: 2000,
            },
        );

        let tracker = tracker(&adapter);
        assert_eq!(tracker.renewal_price(3, 2).await.unwrap(), 1_210);

        let err = tracker.renewal_price(4, 0).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_sale_without_publication_is_not_found() {
        let adapter = Arc::new(InMemoryAdapter::default());
        let mut tracker = tracker(&adapter);
        assert_eq!(tracker.refresh().await.unwrap_err().kind(), ErrorKind::NotFound);
    }
}
