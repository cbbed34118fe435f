//! Shared primitive types
//!
//! Numeric aliases follow the chain runtimes they mirror; wrapper types are
//! serialized as `0x`-prefixed hex so snapshots stay readable in JSON.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Relay-chain block number divided by the timeslice period
pub type Timeslice = u32;

/// Index of a core on the relay chain
pub type CoreIndex = u16;

/// Block height on any of the three chains
pub type BlockNumber = u32;

/// Balance in the smallest unit of the relay-native token
pub type Balance = u128;

/// Parachain (task) identifier assigned to a region
pub type TaskId = u32;

/// Milliseconds since the Unix epoch, as reported by a chain's timestamp pallet
pub type Timestamp = u64;

/// The three chains this engine synchronizes between
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ChainId {
    /// Relay chain (native token reserve, schedules cores)
    Relay,
    /// Coretime chain (source of truth for region ownership)
    Coretime,
    /// Market chain (listings and remote holders)
    Market,
}

impl ChainId {
    /// All chains, in a stable order
    pub const ALL: [ChainId; 3] = [ChainId::Relay, ChainId::Coretime, ChainId::Market];

    /// Short lowercase name, used in logs and metric labels
    pub fn name(&self) -> &'static str {
        match self {
            ChainId::Relay => "relay",
            ChainId::Coretime => "coretime",
            ChainId::Market => "market",
        }
    }

    /// Whether this chain is a parachain of the relay
    pub fn is_parachain(&self) -> bool {
        !matches!(self, ChainId::Relay)
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn parse_hex_32(s: &str) -> crate::Result<[u8; 32]> {
    let stripped = s.strip_prefix("0x").unwrap_or(s);
    let bytes = hex::decode(stripped)
        .map_err(|e| crate::Error::InvalidEncoding(format!("'{}': {}", s, e)))?;
    bytes.try_into().map_err(|b: Vec<u8>| {
        crate::Error::InvalidEncoding(format!("expected 32 bytes, got {}", b.len()))
    })
}

/// 32-byte account identifier (public key)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AccountId([u8; 32]);

impl AccountId {
    /// Create from raw bytes
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Raw bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl FromStr for AccountId {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        parse_hex_32(s).map(Self)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl Serialize for AccountId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for AccountId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// 32-byte hash (request commitments, block hashes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Hash([u8; 32]);

impl Hash {
    /// Create from raw bytes
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// blake3 digest of `data`
    pub fn digest(data: &[u8]) -> Self {
        Self(*blake3::hash(data).as_bytes())
    }

    /// Raw bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl FromStr for Hash {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        parse_hex_32(s).map(Self)
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl Serialize for Hash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Hash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A fraction in `[0, 1]`.
///
/// Construction clamps, so a `Percentage` can never be observed outside its range.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct Percentage(f64);

impl Percentage {
    /// 0%
    pub const ZERO: Percentage = Percentage(0.0);

    /// 100%
    pub const ONE: Percentage = Percentage(1.0);

    /// Clamp `value` into `[0, 1]`; NaN becomes 0
    pub fn clamped(value: f64) -> Self {
        if value.is_nan() {
            return Self::ZERO;
        }
        Self(value.clamp(0.0, 1.0))
    }

    /// `numerator / denominator`, clamped. A zero denominator yields 0.
    pub fn ratio(numerator: u64, denominator: u64) -> Self {
        if denominator == 0 {
            return Self::ZERO;
        }
        Self::clamped(numerator as f64 / denominator as f64)
    }

    /// Underlying value
    pub fn value(&self) -> f64 {
        self.0
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}%", self.0 * 100.0)
    }
}
