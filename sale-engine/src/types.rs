//! Core types for the sale engine

use region_core::{Balance, BlockNumber, CoreIndex, Timeslice};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of the current bulk sale, as the coretime chain stores it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleInfo {
    /// Block at which the cycle (and its interlude) starts
    pub sale_start: BlockNumber,
    /// Length of this sale's leadin in blocks
    pub leadin_length: BlockNumber,
    /// Price at the end of the leadin and throughout the regular phase
    pub floor_price: Balance,
    /// First timeslice of the regions on sale
    pub region_begin: Timeslice,
    /// Timeslice on which the regions on sale end
    pub region_end: Timeslice,
    /// Index of the first core on sale
    pub first_core: CoreIndex,
    /// Number of cores that should ideally sell
    pub ideal_cores_sold: CoreIndex,
    /// Number of cores offered
    pub cores_offered: CoreIndex,
    /// Number of cores sold; never more than `cores_offered`
    pub cores_sold: CoreIndex,
    /// Price at which `cores_sold` first reached `ideal_cores_sold`
    pub sellout_price: Option<Balance>,
    /// Sellout price of the previous cycle, reported during the interlude
    #[serde(default)]
    pub previous_sellout_price: Option<Balance>,
}

impl SaleInfo {
    /// Check `cores_sold <= cores_offered`
    pub fn validate(&self) -> crate::Result<()> {
        if self.cores_sold > self.cores_offered {
            return Err(crate::Error::InvalidSale(format!(
                "{} cores sold but only {} offered",
                self.cores_sold, self.cores_offered
            )));
        }
        if self.region_begin > self.region_end {
            return Err(crate::Error::InvalidSale(format!(
                "regions begin at {} after they end at {}",
                self.region_begin, self.region_end
            )));
        }
        Ok(())
    }

    /// Whether every offered core has been sold
    pub fn all_cores_sold(&self) -> bool {
        self.cores_sold >= self.cores_offered
    }

    /// Whether the ideal number of cores has been sold
    pub fn ideal_reached(&self) -> bool {
        self.cores_sold >= self.ideal_cores_sold
    }
}

/// Sale configuration of the broker pallet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleConfig {
    /// Length of the interlude in blocks
    pub interlude_length: BlockNumber,
    /// Length of the leadin in blocks for forthcoming sales
    pub leadin_length: BlockNumber,
    /// Length of the regions on sale in timeslices
    pub region_length: Timeslice,
    /// Fractional price increase applied per renewal cycle (0.03 = 3%)
    pub renewal_bump: Decimal,
}

/// Phase of a sale cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Before the leadin; no purchases
    Interlude,
    /// Price decays toward the floor
    Leadin,
    /// Fixed floor price
    Regular,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Interlude => write!(f, "interlude"),
            Phase::Leadin => write!(f, "leadin"),
            Phase::Regular => write!(f, "regular"),
        }
    }
}
