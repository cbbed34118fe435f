//! 80-bit core occupancy masks
//!
//! Bit index `0` is the most significant bit of the mask, matching both the hex form chains
//! expose (`0x` + 20 hex digits, big-endian) and the 80-character binary string form used
//! when a region is split. Internally the mask lives in the low 80 bits of a `u128`.

use crate::{types::Percentage, Error, Result, CORE_MASK_BITS};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::{BitAnd, BitOr, BitXor, Not};

const MASK_LIMIT: u128 = (1u128 << CORE_MASK_BITS) - 1;

/// Occupancy bitmap of a region over its core
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CoreMask(u128);

impl CoreMask {
    /// Every part of the core
    pub fn complete() -> Self {
        Self(MASK_LIMIT)
    }

    /// No part of the core
    pub fn void() -> Self {
        Self(0)
    }

    /// Build from the low 80 bits of `raw`; higher bits are an error
    pub fn from_raw(raw: u128) -> Result<Self> {
        if raw > MASK_LIMIT {
            return Err(Error::InvalidMask(format!(
                "value {:#x} does not fit in {} bits",
                raw, CORE_MASK_BITS
            )));
        }
        Ok(Self(raw))
    }

    /// Raw 80-bit value
    pub fn raw(&self) -> u128 {
        self.0
    }

    /// Mask with exactly the bits `start..=end_inclusive` set
    pub fn from_chunk(start: u32, end_inclusive: u32) -> Result<Self> {
        if start > end_inclusive || end_inclusive >= CORE_MASK_BITS {
            return Err(Error::InvalidMask(format!(
                "chunk {}..={} outside 0..{}",
                start, end_inclusive, CORE_MASK_BITS
            )));
        }
        let width = end_inclusive - start + 1;
        let run = (1u128 << width) - 1;
        Ok(Self(run << (CORE_MASK_BITS - 1 - end_inclusive)))
    }

    fn bit(index: u32) -> u128 {
        1u128 << (CORE_MASK_BITS - 1 - index)
    }

    /// Whether bit `index` is set (out-of-range indices are never set)
    pub fn is_set(&self, index: u32) -> bool {
        index < CORE_MASK_BITS && self.0 & Self::bit(index) != 0
    }

    /// Number of set bits
    pub fn count_ones(&self) -> u32 {
        self.0.count_ones()
    }

    /// No bits set
    pub fn is_void(&self) -> bool {
        self.0 == 0
    }

    /// All 80 bits set
    pub fn is_complete(&self) -> bool {
        self.0 == MASK_LIMIT
    }

    /// Fraction of the core this mask occupies
    pub fn occupancy(&self) -> Percentage {
        Percentage::ratio(self.count_ones() as u64, CORE_MASK_BITS as u64)
    }

    /// Index of the first set bit
    pub fn first_set_bit(&self) -> Option<u32> {
        if self.is_void() {
            return None;
        }
        let highest = 127 - self.0.leading_zeros();
        Some(CORE_MASK_BITS - 1 - highest)
    }

    /// Index of the last set bit
    pub fn last_set_bit(&self) -> Option<u32> {
        if self.is_void() {
            return None;
        }
        Some(CORE_MASK_BITS - 1 - self.0.trailing_zeros())
    }

    /// Split this mask at `pivot`.
    ///
    /// The first mask keeps this mask's bits from its first set bit through `pivot`
    /// inclusive; the second is the remainder. Both halves must be non-void, so `pivot` has
    /// to lie in `[first_set_bit, last_set_bit)`.
    pub fn interlace(&self, pivot: u32) -> Result<(CoreMask, CoreMask)> {
        let (first, last) = match (self.first_set_bit(), self.last_set_bit()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(Error::InvalidMask("cannot interlace a void mask".to_string())),
        };

        if first == last {
            return Err(Error::InvalidMask(format!(
                "cannot interlace a single-part mask (bit {})",
                first
            )));
        }

        if pivot < first || pivot >= last {
            return Err(Error::InvalidMask(format!(
                "pivot {} must lie in {}..{}",
                pivot, first, last
            )));
        }

        let head = *self & CoreMask::from_chunk(first, pivot)?;
        let tail = *self ^ head;

        if head.is_void() || tail.is_void() {
            return Err(Error::InvalidMask(format!(
                "pivot {} leaves an empty half",
                pivot
            )));
        }

        Ok((head, tail))
    }

    /// 80-character string of `0`/`1`, bit 0 first
    pub fn to_binary_string(&self) -> String {
        (0..CORE_MASK_BITS)
            .map(|i| if self.is_set(i) { '1' } else { '0' })
            .collect()
    }

    /// Parse an 80-character `0`/`1` string
    pub fn from_binary_string(s: &str) -> Result<Self> {
        if s.len() != CORE_MASK_BITS as usize {
            return Err(Error::InvalidMask(format!(
                "binary mask must be {} characters, got {}",
                CORE_MASK_BITS,
                s.len()
            )));
        }

        let mut raw = 0u128;
        for (i, c) in s.chars().enumerate() {
            match c {
                '1' => raw |= Self::bit(i as u32),
                '0' => {}
                other => {
                    return Err(Error::InvalidMask(format!(
                        "unexpected character '{}' at position {}",
                        other, i
                    )))
                }
            }
        }
        Ok(Self(raw))
    }

    /// `0x`-prefixed big-endian hex (20 digits)
    pub fn to_hex(&self) -> String {
        let bytes = self.0.to_be_bytes();
        format!("0x{}", hex::encode(&bytes[6..]))
    }

    /// Parse the hex form produced by [`CoreMask::to_hex`]
    pub fn from_hex(s: &str) -> Result<Self> {
        let stripped = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(stripped)
            .map_err(|e| Error::InvalidMask(format!("'{}': {}", s, e)))?;
        if bytes.len() != 10 {
            return Err(Error::InvalidMask(format!(
                "hex mask must be 10 bytes, got {}",
                bytes.len()
            )));
        }

        let mut buf = [0u8; 16];
        buf[6..].copy_from_slice(&bytes);
        Ok(Self(u128::from_be_bytes(buf)))
    }
}

impl BitAnd for CoreMask {
    type Output = CoreMask;

    fn bitand(self, rhs: CoreMask) -> CoreMask {
        CoreMask(self.0 & rhs.0)
    }
}

impl BitOr for CoreMask {
    type Output = CoreMask;

    fn bitor(self, rhs: CoreMask) -> CoreMask {
        CoreMask(self.0 | rhs.0)
    }
}

impl BitXor for CoreMask {
    type Output = CoreMask;

    fn bitxor(self, rhs: CoreMask) -> CoreMask {
        CoreMask(self.0 ^ rhs.0)
    }
}

impl Not for CoreMask {
    type Output = CoreMask;

    fn not(self) -> CoreMask {
        CoreMask(!self.0 & MASK_LIMIT)
    }
}

impl fmt::Display for CoreMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for CoreMask {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for CoreMask {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        CoreMask::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
