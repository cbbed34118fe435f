//! Region identity and value types

use crate::{
    mask::CoreMask,
    types::{AccountId, Balance, BlockNumber, CoreIndex, Percentage, TaskId, Timeslice},
    Error, Result, CORE_MASK_BITS,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const BEGIN_SHIFT: u32 = 96;
const CORE_SHIFT: u32 = CORE_MASK_BITS;

/// Structured region identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RegionId {
    /// Timeslice at which the region begins
    pub begin: Timeslice,
    /// Core the region is scheduled on
    pub core: CoreIndex,
    /// Parts of the core the region occupies
    pub mask: CoreMask,
}

impl RegionId {
    /// Create a region id; a void mask is rejected
    pub fn new(begin: Timeslice, core: CoreIndex, mask: CoreMask) -> Result<Self> {
        if mask.is_void() {
            return Err(Error::InvalidRegionId(format!(
                "region at begin {} core {} has a void mask",
                begin, core
            )));
        }
        Ok(Self { begin, core, mask })
    }

    /// Pack into the 128-bit non-fungible index
    pub fn encode(&self) -> u128 {
        ((self.begin as u128) << BEGIN_SHIFT) | ((self.core as u128) << CORE_SHIFT) | self.mask.raw()
    }

    /// Unpack a 128-bit index
    pub fn decode(packed: u128) -> Result<Self> {
        let begin = (packed >> BEGIN_SHIFT) as Timeslice;
        let core = ((packed >> CORE_SHIFT) & 0xffff) as CoreIndex;
        let mask = CoreMask::from_raw(packed & CoreMask::complete().raw())?;
        Self::new(begin, core, mask).map_err(|_| {
            Error::InvalidRegionId(format!("packed id {} has a void mask", packed))
        })
    }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.encode())
    }
}

impl FromStr for RegionId {
    type Err = Error;

    /// Parse the decimal form of the packed id
    fn from_str(s: &str) -> Result<Self> {
        let packed = s
            .trim()
            .parse::<u128>()
            .map_err(|e| Error::InvalidRegionId(format!("'{}': {}", s, e)))?;
        Self::decode(packed)
    }
}

/// The rest of a region as the coretime chain stores it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionRecord {
    /// Timeslice at which the region ends (exclusive)
    pub end: Timeslice,
    /// Current owner
    pub owner: AccountId,
    /// Amount paid for the region, if bought in a sale
    pub paid: Option<Balance>,
}

impl RegionRecord {
    /// Encode for proofs and cross-chain payloads
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    /// Decode a record carried in a remote-state response
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(bincode::deserialize(bytes)?)
    }
}

/// A renewal offer for a core that already has a workload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenewalQuote {
    /// Price of the next renewal
    pub price: Balance,
    /// Parts of the core the renewal covers
    pub mask: CoreMask,
    /// Task currently assigned
    pub task: TaskId,
}

/// An owned claim on part of a core over `[begin, end)` timeslices
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    id: RegionId,
    end: Timeslice,
    owner: AccountId,
    paid: Option<Balance>,
}

impl Region {
    /// Create a region, checking `begin <= end`
    pub fn new(id: RegionId, end: Timeslice, owner: AccountId, paid: Option<Balance>) -> Result<Self> {
        if id.begin > end {
            return Err(Error::InvalidRegion(format!(
                "region {} begins at {} after its end {}",
                id, id.begin, end
            )));
        }
        Ok(Self { id, end, owner, paid })
    }

    /// Combine an id with the record stored under it
    pub fn from_parts(id: RegionId, record: RegionRecord) -> Result<Self> {
        Self::new(id, record.end, record.owner, record.paid)
    }

    /// Structured id
    pub fn id(&self) -> RegionId {
        self.id
    }

    /// First timeslice
    pub fn begin(&self) -> Timeslice {
        self.id.begin
    }

    /// End timeslice (exclusive)
    pub fn end(&self) -> Timeslice {
        self.end
    }

    /// Core index
    pub fn core(&self) -> CoreIndex {
        self.id.core
    }

    /// Occupancy mask
    pub fn mask(&self) -> CoreMask {
        self.id.mask
    }

    /// Owner
    pub fn owner(&self) -> &AccountId {
        &self.owner
    }

    /// Purchase price, if any
    pub fn paid(&self) -> Option<Balance> {
        self.paid
    }

    /// Length in timeslices
    pub fn duration(&self) -> Timeslice {
        self.end - self.id.begin
    }

    /// The record half of this region
    pub fn record(&self) -> RegionRecord {
        RegionRecord {
            end: self.end,
            owner: self.owner,
            paid: self.paid,
        }
    }

    /// Fraction of the core this region occupies
    pub fn occupancy(&self) -> Percentage {
        self.id.mask.occupancy()
    }

    /// Fraction of the region's lifetime that has elapsed at relay block `current_block`.
    ///
    /// Never negative for regions that have not started, never above one for regions that
    /// have ended.
    pub fn consumed(&self, current_block: BlockNumber, timeslice_period: BlockNumber) -> Percentage {
        let period = timeslice_period as u64;
        let begin_block = self.id.begin as u64 * period;
        let end_block = self.end as u64 * period;
        let current = current_block as u64;

        if current <= begin_block {
            return Percentage::ZERO;
        }
        if end_block <= begin_block {
            return Percentage::ONE;
        }
        Percentage::ratio(current - begin_block, end_block - begin_block)
    }

    /// Split the region's mask at `pivot` into two regions over the same timeslices.
    ///
    /// Neither half carries the purchase price.
    pub fn interlace(&self, pivot: u32) -> Result<(Region, Region)> {
        let (head, tail) = self.id.mask.interlace(pivot)?;
        let split = |mask| Region {
            id: RegionId { mask, ..self.id },
            end: self.end,
            owner: self.owner,
            paid: None,
        };
        Ok((split(head), split(tail)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner() -> AccountId {
        AccountId::new([1u8; 32])
    }

    fn region(begin: Timeslice, end: Timeslice) -> Region {
        let id = RegionId::new(begin, 3, CoreMask::complete()).unwrap();
        Region::new(id, end, owner(), Some(1_000)).unwrap()
    }

    #[test]
    fn test_encode_layout() {
        let id = RegionId::new(1, 2, CoreMask::from_chunk(79, 79).unwrap()).unwrap();
        let packed = id.encode();
        assert_eq!(packed >> 96, 1);
        assert_eq!((packed >> 80) & 0xffff, 2);
        assert_eq!(packed & CoreMask::complete().raw(), 1);
        assert_eq!(RegionId::decode(packed).unwrap(), id);
    }

    #[test]
    fn test_decode_rejects_void_mask() {
        let packed = (5u128 << 96) | (1u128 << 80);
        let err = RegionId::decode(packed).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::InvalidInput);
    }

    #[test]
    fn test_parse_decimal_id() {
        let id = RegionId::new(10_000, 12, CoreMask::complete()).unwrap();
        let text = id.to_string();
        assert_eq!(text.parse::<RegionId>().unwrap(), id);
        assert!("not-a-number".parse::<RegionId>().is_err());
        // 2^128 does not fit
        assert!("340282366920938463463374607431768211456".parse::<RegionId>().is_err());
    }

    #[test]
    fn test_region_rejects_inverted_range() {
        let id = RegionId::new(200, 0, CoreMask::complete()).unwrap();
        assert!(Region::new(id, 100, owner(), None).is_err());
    }

    #[test]
    fn test_consumed_examples() {
        let r = region(100, 200);
        assert_eq!(r.consumed(100, 1), Percentage::ZERO);
        assert_eq!(r.consumed(50, 1), Percentage::ZERO);
        assert_eq!(r.consumed(150, 1).value(), 0.5);
        assert_eq!(r.consumed(250, 1), Percentage::ONE);
    }

    #[test]
    fn test_consumed_uses_timeslice_period() {
        let r = region(10, 20);
        assert_eq!(r.consumed(1_200, 80).value(), 0.5);
    }

    #[test]
    fn test_zero_length_region() {
        let r = region(100, 100);
        assert_eq!(r.consumed(100, 1), Percentage::ZERO);
        assert_eq!(r.consumed(101, 1), Percentage::ONE);
    }

    #[test]
    fn test_record_bytes_roundtrip() {
        let r = region(1, 2);
        let bytes = r.record().to_bytes().unwrap();
        let record = RegionRecord::from_bytes(&bytes).unwrap();
        assert_eq!(Region::from_parts(r.id(), record).unwrap(), r);
    }

    #[test]
    fn test_interlace_region() {
        let id = RegionId::new(1, 0, CoreMask::from_chunk(10, 19).unwrap()).unwrap();
        let r = Region::new(id, 5, owner(), Some(10)).unwrap();
        let (a, b) = r.interlace(15).unwrap();
        assert_eq!(a.mask().count_ones(), 6);
        assert_eq!(b.mask().count_ones(), 4);
        assert_eq!(a.paid(), None);
        assert_eq!(a.end(), 5);
    }
}
