//! Sale phase boundaries
//!
//! Boundaries are derived once per cycle from the sale info and configuration; the phase at
//! any block is then a pure lookup against them.

use crate::{
    types::{Phase, SaleConfig, SaleInfo},
    Error, Result,
};
use chrono::{DateTime, Duration, Utc};
use region_core::{BlockNumber, Timestamp};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The four block numbers that delimit a sale cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleBoundaries {
    /// Start of the interlude
    pub sale_start: BlockNumber,
    /// End of the interlude, start of the leadin
    pub interlude_end: BlockNumber,
    /// End of the leadin, start of the regular phase
    pub leadin_end: BlockNumber,
    /// End of the cycle
    pub sale_end: BlockNumber,
}

impl SaleBoundaries {
    /// Derive the boundaries of `info`'s cycle.
    ///
    /// `blocks_per_timeslice` converts the configured region length into local blocks.
    pub fn derive(
        info: &SaleInfo,
        config: &SaleConfig,
        blocks_per_timeslice: BlockNumber,
    ) -> Result<Self> {
        info.validate()?;

        let overflow = |what: &str| Error::Overflow(format!("{} exceeds the block range", what));

        let interlude_end = info
            .sale_start
            .checked_add(config.interlude_length)
            .ok_or_else(|| overflow("interlude end"))?;
        let leadin_end = interlude_end
            .checked_add(info.leadin_length)
            .ok_or_else(|| overflow("leadin end"))?;
        let cycle_length = config
            .region_length
            .checked_mul(blocks_per_timeslice)
            .ok_or_else(|| overflow("cycle length"))?;
        let sale_end = info
            .sale_start
            .checked_add(cycle_length)
            .ok_or_else(|| overflow("sale end"))?;

        if sale_end < leadin_end {
            return Err(Error::InvalidSale(format!(
                "cycle ends at block {} before the leadin ends at {}",
                sale_end, leadin_end
            )));
        }

        Ok(Self {
            sale_start: info.sale_start,
            interlude_end,
            leadin_end,
            sale_end,
        })
    }

    /// Whether `now` is past this cycle, meaning a fresh sale info must be read
    pub fn is_stale(&self, now: BlockNumber) -> bool {
        now >= self.sale_end
    }

    /// Fraction of the leadin elapsed at `now`, in `[0, 1]`
    pub fn leadin_progress(&self, now: BlockNumber) -> Decimal {
        let length = self.leadin_end - self.interlude_end;
        if length == 0 || now >= self.leadin_end {
            return Decimal::ONE;
        }
        if now <= self.interlude_end {
            return Decimal::ZERO;
        }
        Decimal::from(now - self.interlude_end) / Decimal::from(length)
    }

    /// Project the boundaries onto wall-clock time.
    ///
    /// `reference_block` was produced at `reference_timestamp` (ms); blocks are assumed to
    /// arrive every `block_time_ms`.
    pub fn to_wall_clock(
        &self,
        reference_block: BlockNumber,
        reference_timestamp: Timestamp,
        block_time_ms: u64,
    ) -> Result<WallClockBoundaries> {
        let at = |block: BlockNumber| -> Result<DateTime<Utc>> {
            let out_of_range =
                || Error::Overflow(format!("block {} is out of the time range", block));
            let delta_blocks = block as i64 - reference_block as i64;
            let step = i64::try_from(block_time_ms).map_err(|_| out_of_range())?;
            let start = i64::try_from(reference_timestamp).map_err(|_| out_of_range())?;

            delta_blocks
                .checked_mul(step)
                .and_then(Duration::try_milliseconds)
                .and_then(|offset| {
                    DateTime::<Utc>::from_timestamp_millis(start)
                        .and_then(|t| t.checked_add_signed(offset))
                })
                .ok_or_else(out_of_range)
        };

        Ok(WallClockBoundaries {
            sale_start: at(self.sale_start)?,
            interlude_end: at(self.interlude_end)?,
            leadin_end: at(self.leadin_end)?,
            sale_end: at(self.sale_end)?,
        })
    }
}

/// [`SaleBoundaries`] in wall-clock time, for display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WallClockBoundaries {
    /// Start of the interlude
    pub sale_start: DateTime<Utc>,
    /// Start of the leadin
    pub interlude_end: DateTime<Utc>,
    /// Start of the regular phase
    pub leadin_end: DateTime<Utc>,
    /// End of the cycle
    pub sale_end: DateTime<Utc>,
}

/// Phase of the sale at block `now`.
///
/// Blocks before `sale_start` report the interlude; blocks at or after `sale_end` keep
/// reporting the regular phase until the caller refreshes the cycle (see
/// [`SaleBoundaries::is_stale`]).
pub fn current_phase(boundaries: &SaleBoundaries, now: BlockNumber) -> Phase {
    if now < boundaries.interlude_end {
        Phase::Interlude
    } else if now < boundaries.leadin_end {
        Phase::Leadin
    } else {
        Phase::Regular
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SaleConfig;

    fn sale_info() -> SaleInfo {
        SaleInfo {
            sale_start: 1_000,
            leadin_length: 100,
            floor_price: 1_000_000,
            region_begin: 50,
            region_end: 60,
            first_core: 0,
            ideal_cores_sold: 4,
            cores_offered: 10,
            cores_sold: 0,
            sellout_price: None,
            previous_sellout_price: Some(2_000_000),
        }
    }

    fn sale_config() -> SaleConfig {
        SaleConfig {
            interlude_length: 50,
            leadin_length: 100,
            region_length: 10,
            renewal_bump: Decimal::new(3, 2),
        }
    }

    #[test]
    fn test_derive_boundaries() {
        let b = SaleBoundaries::derive(&sale_info(), &sale_config(), 40).unwrap();
        assert_eq!(b.sale_start, 1_000);
        assert_eq!(b.interlude_end, 1_050);
        assert_eq!(b.leadin_end, 1_150);
        assert_eq!(b.sale_end, 1_400);
    }

    #[test]
    fn test_phase_transitions() {
        let b = SaleBoundaries::derive(&sale_info(), &sale_config(), 40).unwrap();
        assert_eq!(current_phase(&b, 900), Phase::Interlude);
        assert_eq!(current_phase(&b, 1_000), Phase::Interlude);
        assert_eq!(current_phase(&b, 1_049), Phase::Interlude);
        assert_eq!(current_phase(&b, 1_050), Phase::Leadin);
        assert_eq!(current_phase(&b, 1_149), Phase::Leadin);
        assert_eq!(current_phase(&b, 1_150), Phase::Regular);
        assert!(!b.is_stale(1_399));
        assert!(b.is_stale(1_400));
    }

    #[test]
    fn test_leadin_progress() {
        let b = SaleBoundaries::derive(&sale_info(), &sale_config(), 40).unwrap();
        assert_eq!(b.leadin_progress(1_000), Decimal::ZERO);
        assert_eq!(b.leadin_progress(1_100), Decimal::new(5, 1));
        assert_eq!(b.leadin_progress(2_000), Decimal::ONE);
    }

    #[test]
    fn test_cycle_shorter_than_leadin_is_rejected() {
        let mut config = sale_config();
        config.region_length = 1;
        assert!(SaleBoundaries::derive(&sale_info(), &config, 40).is_err());
    }

    #[test]
    fn test_oversold_info_is_rejected() {
        let mut info = sale_info();
        info.cores_sold = 11;
        let err = SaleBoundaries::derive(&info, &sale_config(), 40).unwrap_err();
        assert_eq!(err.kind(), region_core::ErrorKind::InvalidInput);
    }

    #[test]
    fn test_wall_clock_projection() {
        let b = SaleBoundaries::derive(&sale_info(), &sale_config(), 40).unwrap();
        let wall = b.to_wall_clock(1_000, 1_700_000_000_000, 12_000).unwrap();
        assert_eq!(wall.sale_start.timestamp_millis(), 1_700_000_000_000);
        assert_eq!(wall.interlude_end.timestamp_millis(), 1_700_000_000_000 + 50 * 12_000);
    }

    #[test]
    fn test_wall_clock_overflow_is_reported() {
        let b = SaleBoundaries::derive(&sale_info(), &sale_config(), 40).unwrap();
        let err = b.to_wall_clock(0, 1_700_000_000_000, u64::MAX).unwrap_err();
        assert_eq!(err.kind(), region_core::ErrorKind::Overflow);

        let err = b.to_wall_clock(0, 1_700_000_000_000, 1 << 50).unwrap_err();
        assert!(matches!(err, Error::Overflow(_)));
    }
}
