//! Price curve and purchase bookkeeping
//!
//! # Leadin curve
//!
//! During the leadin the price is `floor_price × factor(progress)` where `progress` runs
//! from 0 at the start of the leadin to 1 at its end. The factor must be non-increasing,
//! equal the configured start multiple at 0 and exactly 1 at 1. The curve is a trait so the
//! shape can follow the chain runtime; [`LinearLeadin`] is the default.
//!
//! # Fixed point
//!
//! Factors are applied to balances as integers scaled by 10^9 and the product is rounded
//! down, so a factor with at most nine decimal places is applied exactly.

use crate::{
    config::Config,
    phase::{current_phase, SaleBoundaries},
    types::{Phase, SaleInfo},
    Error, Result,
};
use region_core::{Balance, BlockNumber};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tracing::{debug, info};

const FIXED_POINT_SCALE: u128 = 1_000_000_000;

/// Multiply a balance by a non-negative decimal factor, rounding down
pub(crate) fn apply_factor(amount: Balance, factor: Decimal) -> Result<Balance> {
    if factor.is_sign_negative() {
        return Err(Error::InvalidSale(format!("negative price factor {}", factor)));
    }

    let scaled = (factor * Decimal::from(FIXED_POINT_SCALE as u64))
        .trunc()
        .to_u128()
        .ok_or_else(|| Error::Overflow(format!("factor {} out of range", factor)))?;

    // amount = whole × SCALE + rest, so only a product that truly exceeds u128 fails
    let whole = amount / FIXED_POINT_SCALE;
    let rest = amount % FIXED_POINT_SCALE;

    whole
        .checked_mul(scaled)
        .and_then(|w| {
            rest.checked_mul(scaled)
                .and_then(|r| w.checked_add(r / FIXED_POINT_SCALE))
        })
        .ok_or_else(|| Error::Overflow(format!("{} × {} exceeds the balance range", amount, factor)))
}

/// Shape of the leadin price decay
pub trait LeadinCurve: Send + Sync + std::fmt::Debug {
    /// Factor to apply to the floor price at `progress` in `[0, 1]`
    fn factor_at(&self, progress: Decimal) -> Decimal;

    /// Factor at the start of the leadin
    fn start_multiple(&self) -> Decimal {
        self.factor_at(Decimal::ZERO)
    }
}

/// Straight line from `start_multiple` down to 1
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinearLeadin {
    start_multiple: Decimal,
}

impl LinearLeadin {
    /// Create a linear curve; the start multiple must be at least 1
    pub fn new(start_multiple: Decimal) -> Result<Self> {
        if start_multiple < Decimal::ONE {
            return Err(Error::Config(format!(
                "leadin start multiple {} is below 1",
                start_multiple
            )));
        }
        Ok(Self { start_multiple })
    }
}

impl Default for LinearLeadin {
    fn default() -> Self {
        Self {
            start_multiple: Decimal::TWO,
        }
    }
}

impl LeadinCurve for LinearLeadin {
    fn factor_at(&self, progress: Decimal) -> Decimal {
        let progress = progress.clamp(Decimal::ZERO, Decimal::ONE);
        self.start_multiple - (self.start_multiple - Decimal::ONE) * progress
    }
}

/// Computes prices for a sale
#[derive(Debug)]
pub struct PriceEngine {
    curve: Box<dyn LeadinCurve>,
}

impl PriceEngine {
    /// Create an engine over `curve`
    pub fn new(curve: impl LeadinCurve + 'static) -> Self {
        Self {
            curve: Box::new(curve),
        }
    }

    /// Create an engine from configuration; an invalid start multiple is an error
    pub fn from_config(config: &Config) -> Result<Self> {
        let curve = LinearLeadin::new(config.leadin.start_multiple)?;
        Ok(Self::new(curve))
    }

    /// Leadin curve in use
    pub fn curve(&self) -> &dyn LeadinCurve {
        self.curve.as_ref()
    }

    /// Price at leadin progress `progress`
    pub fn leadin_price(&self, floor_price: Balance, progress: Decimal) -> Result<Balance> {
        apply_factor(floor_price, self.curve.factor_at(progress))
    }

    /// Price during `phase` at block `now`.
    ///
    /// `None` during the interlude, once every offered core is sold, and in the regular
    /// phase once the ideal number of cores is sold.
    pub fn price_in_phase(
        &self,
        info: &SaleInfo,
        boundaries: &SaleBoundaries,
        phase: Phase,
        now: BlockNumber,
    ) -> Result<Option<Balance>> {
        if info.all_cores_sold() {
            return Ok(None);
        }

        match phase {
            Phase::Interlude => Ok(None),
            Phase::Leadin => {
                let progress = boundaries.leadin_progress(now);
                self.leadin_price(info.floor_price, progress).map(Some)
            }
            Phase::Regular if info.ideal_reached() => Ok(None),
            Phase::Regular => Ok(Some(info.floor_price)),
        }
    }

    /// Price at block `now`
    pub fn current_price(
        &self,
        info: &SaleInfo,
        boundaries: &SaleBoundaries,
        now: BlockNumber,
    ) -> Result<Option<Balance>> {
        let phase = current_phase(boundaries, now);
        self.price_in_phase(info, boundaries, phase, now)
    }

    /// Price shown for information when no purchase price is defined.
    ///
    /// During the interlude this is the previous cycle's sellout price.
    pub fn informational_price(&self, info: &SaleInfo, phase: Phase) -> Option<Balance> {
        match phase {
            Phase::Interlude => info.previous_sellout_price,
            Phase::Leadin | Phase::Regular => info.sellout_price,
        }
    }
}

/// A sale snapshot with its boundaries, able to record purchases
#[derive(Debug, Clone)]
pub struct SaleState {
    info: SaleInfo,
    boundaries: SaleBoundaries,
}

impl SaleState {
    /// Pair a sale with its boundaries
    pub fn new(info: SaleInfo, boundaries: SaleBoundaries) -> Result<Self> {
        info.validate()?;
        Ok(Self { info, boundaries })
    }

    /// Current sale info
    pub fn info(&self) -> &SaleInfo {
        &self.info
    }

    /// Cycle boundaries
    pub fn boundaries(&self) -> &SaleBoundaries {
        &self.boundaries
    }

    /// Phase at `now`
    pub fn phase(&self, now: BlockNumber) -> Phase {
        current_phase(&self.boundaries, now)
    }

    /// Sell one core at block `now` and return the price paid.
    ///
    /// The purchase that brings `cores_sold` to `ideal_cores_sold` latches the sellout
    /// price; later purchases in the cycle never change it.
    pub fn record_purchase(&mut self, engine: &PriceEngine, now: BlockNumber) -> Result<Balance> {
        let phase = self.phase(now);

        if phase == Phase::Interlude {
            return Err(Error::NotForSale(format!(
                "block {} is in the interlude (leadin starts at {})",
                now, self.boundaries.interlude_end
            )));
        }

        if self.info.all_cores_sold() {
            return Err(Error::SoldOut(format!(
                "all {} offered cores sold",
                self.info.cores_offered
            )));
        }

        let price = engine
            .price_in_phase(&self.info, &self.boundaries, phase, now)?
            .ok_or_else(|| {
                Error::SoldOut(format!(
                    "ideal of {} cores reached in the {} phase",
                    self.info.ideal_cores_sold, phase
                ))
            })?;

        self.info.cores_sold += 1;
        debug!(
            "Core sold at block {} ({} phase) for {}; {}/{} sold",
            now, phase, price, self.info.cores_sold, self.info.cores_offered
        );

        if self.info.sellout_price.is_none() && self.info.ideal_reached() {
            self.info.sellout_price = Some(price);
            info!(
                "Sellout price latched at {} after {} cores sold",
                price, self.info.cores_sold
            );
        }

        Ok(price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SaleConfig;

    fn sale_info() -> SaleInfo {
        SaleInfo {
            sale_start: 0,
            leadin_length: 100,
            floor_price: 1_000,
            region_begin: 10,
            region_end: 20,
            first_core: 0,
            ideal_cores_sold: 2,
            cores_offered: 4,
            cores_sold: 0,
            sellout_price: None,
            previous_sellout_price: Some(1_500),
        }
    }

    fn state() -> SaleState {
        let info = sale_info();
        let config = SaleConfig {
            interlude_length: 10,
            leadin_length: 100,
            region_length: 10,
            renewal_bump: Decimal::new(3, 2),
        };
        let boundaries = SaleBoundaries::derive(&info, &config, 40).unwrap();
        SaleState::new(info, boundaries).unwrap()
    }

    #[test]
    fn test_linear_curve_endpoints() {
        let curve = LinearLeadin::new(Decimal::from(100)).unwrap();
        assert_eq!(curve.factor_at(Decimal::ZERO), Decimal::from(100));
        assert_eq!(curve.factor_at(Decimal::ONE), Decimal::ONE);
        assert_eq!(curve.start_multiple(), Decimal::from(100));
    }

    #[test]
    fn test_curve_below_one_rejected() {
        assert!(LinearLeadin::new(Decimal::new(5, 1)).is_err());
    }

    #[test]
    fn test_leadin_prices() {
        let engine = PriceEngine::new(LinearLeadin::default());
        let state = state();
        let (info, b) = (state.info(), state.boundaries());

        // leadin runs [10, 110)
        assert_eq!(engine.current_price(info, b, 10).unwrap(), Some(2_000));
        assert_eq!(engine.current_price(info, b, 60).unwrap(), Some(1_500));
        assert_eq!(engine.current_price(info, b, 110).unwrap(), Some(1_000));
    }

    #[test]
    fn test_no_price_in_interlude() {
        let engine = PriceEngine::new(LinearLeadin::default());
        let state = state();
        assert_eq!(engine.current_price(state.info(), state.boundaries(), 5).unwrap(), None);
        assert_eq!(engine.informational_price(state.info(), Phase::Interlude), Some(1_500));
    }

    #[test]
    fn test_sellout_latch() {
        let engine = PriceEngine::new(LinearLeadin::default());
        let mut state = state();

        let first = state.record_purchase(&engine, 10).unwrap();
        assert_eq!(first, 2_000);
        assert_eq!(state.info().sellout_price, None);

        let second = state.record_purchase(&engine, 60).unwrap();
        assert_eq!(second, 1_500);
        assert_eq!(state.info().sellout_price, Some(1_500));

        // Later purchases leave the latch alone
        state.record_purchase(&engine, 100).unwrap();
        assert_eq!(state.info().sellout_price, Some(1_500));
    }

    #[test]
    fn test_regular_phase_sold_out_after_ideal() {
        let engine = PriceEngine::new(LinearLeadin::default());
        let mut state = state();

        assert_eq!(state.record_purchase(&engine, 200).unwrap(), 1_000);
        assert_eq!(state.record_purchase(&engine, 201).unwrap(), 1_000);
        assert_eq!(state.info().sellout_price, Some(1_000));

        let err = state.record_purchase(&engine, 202).unwrap_err();
        assert!(matches!(err, Error::SoldOut(_)));
        assert_eq!(engine.current_price(state.info(), state.boundaries(), 202).unwrap(), None);
    }

    #[test]
    fn test_purchase_rejected_in_interlude() {
        let engine = PriceEngine::new(LinearLeadin::default());
        let mut state = state();
        let err = state.record_purchase(&engine, 0).unwrap_err();
        assert!(matches!(err, Error::NotForSale(_)));
        assert_eq!(state.info().cores_sold, 0);
    }

    #[test]
    fn test_all_cores_sold_during_leadin() {
        let engine = PriceEngine::new(LinearLeadin::default());
        let mut state = state();
        for _ in 0..4 {
            state.record_purchase(&engine, 20).unwrap();
        }
        assert!(state.info().all_cores_sold());
        assert!(state.record_purchase(&engine, 21).is_err());
    }

    #[test]
    fn test_from_config_rejects_bad_multiple() {
        let mut config = Config::default();
        config.leadin.start_multiple = Decimal::new(5, 1);
        let err = PriceEngine::from_config(&config).unwrap_err();
        assert_eq!(err.kind(), region_core::ErrorKind::Config);

        config.leadin.start_multiple = Decimal::from(3);
        let engine = PriceEngine::from_config(&config).unwrap();
        assert_eq!(engine.curve().start_multiple(), Decimal::from(3));
    }

    #[test]
    fn test_apply_factor_large_amounts() {
        // The intermediate product exceeds u128 but the result does not
        let amount = u128::MAX / 2;
        assert_eq!(apply_factor(amount, Decimal::ONE).unwrap(), amount);
        assert_eq!(apply_factor(amount, Decimal::new(15, 1)).unwrap(), amount / 2 * 3 + 1);
        assert_eq!(apply_factor(1_000, Decimal::new(15, 1)).unwrap(), 1_500);
    }

    #[test]
    fn test_apply_factor_overflow() {
        let err = apply_factor(u128::MAX, Decimal::TWO).unwrap_err();
        assert_eq!(err.kind(), region_core::ErrorKind::Overflow);
    }
}
