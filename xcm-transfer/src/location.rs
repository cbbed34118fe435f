//! Relative chain locations
//!
//! A [`Location`] is a path from the sender's point of view: walk up `parents` levels, then
//! down through `interior` junctions. `{ parents: 1, interior: Here }` seen from a parachain
//! is the relay chain; `{ parents: 0, interior: [Parachain(1005)] }` seen from the relay is
//! the Coretime chain.

use crate::{Error, Result};
use region_core::AccountId;
use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Serialize, Serializer};

/// Deepest interior path a location may carry
pub const MAX_JUNCTIONS: usize = 8;

/// One step of an interior path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Junction {
    /// A parachain of the current relay
    Parachain(u32),
    /// A 32-byte account on the current chain
    AccountId32 {
        /// Account key
        id: AccountId,
    },
    /// A pallet by its runtime index
    PalletInstance(u8),
}

impl Serialize for Junction {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        match self {
            Junction::Parachain(id) => map.serialize_entry("Parachain", id)?,
            Junction::AccountId32 { id } => {
                map.serialize_entry("AccountId32", &AccountKey { id })?
            }
            Junction::PalletInstance(index) => map.serialize_entry("PalletInstance", index)?,
        }
        map.end()
    }
}

struct AccountKey<'a> {
    id: &'a AccountId,
}

impl Serialize for AccountKey<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("AccountId32", 2)?;
        s.serialize_field("network", &Option::<()>::None)?;
        s.serialize_field("id", self.id)?;
        s.end()
    }
}

/// Interior path of a location; empty means `Here`
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Junctions(Vec<Junction>);

impl Junctions {
    /// The empty path
    pub fn here() -> Self {
        Self(Vec::new())
    }

    /// Build a path, rejecting anything deeper than [`MAX_JUNCTIONS`]
    pub fn new(junctions: Vec<Junction>) -> Result<Self> {
        if junctions.len() > MAX_JUNCTIONS {
            return Err(Error::InvalidLocation(format!(
                "{} junctions exceed the maximum of {}",
                junctions.len(),
                MAX_JUNCTIONS
            )));
        }
        Ok(Self(junctions))
    }

    /// Whether this is `Here`
    pub fn is_here(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of junctions
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the path has no junctions
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Junctions in order
    pub fn as_slice(&self) -> &[Junction] {
        &self.0
    }
}

// `Here` or `{"X<n>": [..]}`, the shape the chain RPCs accept
impl Serialize for Junctions {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        if self.0.is_empty() {
            return serializer.serialize_str("Here");
        }
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&format!("X{}", self.0.len()), &self.0)?;
        map.end()
    }
}

/// A location relative to the sender
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Location {
    /// Levels to walk up before descending
    pub parents: u8,
    /// Path to descend
    pub interior: Junctions,
}

impl Location {
    /// `parents` levels up, then `Here`
    pub fn parent_here(parents: u8) -> Self {
        Self {
            parents,
            interior: Junctions::here(),
        }
    }

    /// `parents` levels up, then down through `junctions`
    pub fn new(parents: u8, junctions: Vec<Junction>) -> Result<Self> {
        Ok(Self {
            parents,
            interior: Junctions::new(junctions)?,
        })
    }

    /// The sender itself
    pub fn here() -> Self {
        Self::parent_here(0)
    }

    /// The relay chain, as seen from one of its parachains
    pub fn relay_from_parachain() -> Self {
        Self::parent_here(1)
    }

    /// A sibling parachain, as seen from another parachain
    pub fn sibling(para_id: u32) -> Self {
        Self {
            parents: 1,
            interior: Junctions(vec![Junction::Parachain(para_id)]),
        }
    }

    /// A parachain, as seen from the relay chain
    pub fn child(para_id: u32) -> Self {
        Self {
            parents: 0,
            interior: Junctions(vec![Junction::Parachain(para_id)]),
        }
    }

    /// A local account on the destination
    pub fn account(id: AccountId) -> Self {
        Self {
            parents: 0,
            interior: Junctions(vec![Junction::AccountId32 { id }]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_here_serializes_as_string() {
        let json = serde_json::to_value(Location::relay_from_parachain()).unwrap();
        assert_eq!(json, serde_json::json!({ "parents": 1, "interior": "Here" }));
    }

    #[test]
    fn test_sibling_serialization() {
        let json = serde_json::to_value(Location::sibling(1005)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "parents": 1, "interior": { "X1": [{ "Parachain": 1005 }] } })
        );
    }

    #[test]
    fn test_account_junction() {
        let id = AccountId::new([7u8; 32]);
        let json = serde_json::to_value(Location::account(id)).unwrap();
        assert_eq!(json["interior"]["X1"][0]["AccountId32"]["network"], serde_json::Value::Null);
        assert_eq!(
            json["interior"]["X1"][0]["AccountId32"]["id"],
            serde_json::Value::String(id.to_string())
        );
    }

    #[test]
    fn test_depth_limit() {
        let deep = vec![Junction::PalletInstance(1); MAX_JUNCTIONS + 1];
        assert!(Location::new(1, deep).is_err());
        assert!(Location::new(1, vec![Junction::PalletInstance(1); MAX_JUNCTIONS]).is_ok());
    }
}
