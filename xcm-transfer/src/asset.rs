//! Assets carried by a transfer message

use crate::location::Location;
use region_core::Balance;
use serde::Serialize;

/// Amount or instance of an asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Fungibility {
    /// A balance of a fungible asset
    Fungible(#[serde(serialize_with = "as_string")] u128),
    /// One instance of a non-fungible collection
    NonFungible(AssetInstance),
}

/// Instance identifier within a non-fungible collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum AssetInstance {
    /// Numeric index (packed region ids use this)
    Index(#[serde(serialize_with = "as_string")] u128),
}

// u128 does not survive JSON consumers that parse into doubles
fn as_string<S: serde::Serializer>(value: &u128, s: S) -> std::result::Result<S::Ok, S::Error> {
    s.serialize_str(&value.to_string())
}

/// An asset: where it lives and how much of it
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Asset {
    /// Asset location relative to the sender
    pub id: Location,
    /// Amount or instance
    pub fun: Fungibility,
}

impl Asset {
    /// A fungible balance at `id`
    pub fn fungible(id: Location, amount: Balance) -> Self {
        Self {
            id,
            fun: Fungibility::Fungible(amount),
        }
    }

    /// One non-fungible instance at `id`
    pub fn non_fungible(id: Location, index: u128) -> Self {
        Self {
            id,
            fun: Fungibility::NonFungible(AssetInstance::Index(index)),
        }
    }
}

/// Sorted, de-duplicated asset list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Assets(Vec<Asset>);

impl Assets {
    /// Sort `assets` the way the executor expects them
    pub fn new(mut assets: Vec<Asset>) -> Self {
        assets.sort();
        assets.dedup();
        Self(assets)
    }

    /// Position of `asset` after sorting
    pub fn index_of(&self, asset: &Asset) -> Option<u32> {
        self.0.iter().position(|a| a == asset).map(|i| i as u32)
    }

    /// Assets in order
    pub fn as_slice(&self) -> &[Asset] {
        &self.0
    }

    /// Number of assets
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the list is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
