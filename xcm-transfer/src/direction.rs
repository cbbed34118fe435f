//! Supported transfer routes
//!
//! Every `(source, destination, asset kind)` triple resolves through one `match` without a
//! wildcard arm, so adding a chain or asset kind fails to compile until the table covers it.

use crate::{Error, Result};
use region_core::{Balance, ChainId, RegionId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of asset being moved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetKind {
    /// Relay-native balance
    Fungible,
    /// A coretime region
    Region,
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetKind::Fungible => write!(f, "fungible"),
            AssetKind::Region => write!(f, "region"),
        }
    }
}

/// What a transfer moves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransferAsset {
    /// An amount of the relay-native token
    Fungible(Balance),
    /// One region, addressed by its packed id
    Region(RegionId),
}

impl TransferAsset {
    /// Kind of this asset
    pub fn kind(&self) -> AssetKind {
        match self {
            TransferAsset::Fungible(_) => AssetKind::Fungible,
            TransferAsset::Region(_) => AssetKind::Region,
        }
    }
}

/// Source and destination chain of a transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Direction {
    /// Sending chain
    pub source: ChainId,
    /// Receiving chain
    pub dest: ChainId,
}

impl Direction {
    /// Create a direction
    pub fn new(source: ChainId, dest: ChainId) -> Self {
        Self { source, dest }
    }

    /// The six directed pairs between distinct chains
    pub fn all() -> impl Iterator<Item = Direction> {
        ChainId::ALL.into_iter().flat_map(|source| {
            ChainId::ALL
                .into_iter()
                .filter(move |dest| *dest != source)
                .map(move |dest| Direction::new(source, dest))
        })
    }

    /// The same pair, reversed
    pub fn reversed(&self) -> Self {
        Self::new(self.dest, self.source)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{}", self.source, self.dest)
    }
}

/// Transfer mechanism the sending chain's XCM pallet uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransferMethod {
    /// Burn on the source and mint on a trusted destination
    Teleport,
    /// Move through the asset's reserve chain (the source or the destination)
    ReserveTransfer,
    /// Let the runtime pick the reserve; used when neither side is the reserve
    TransferAssets,
}

impl TransferMethod {
    /// Extrinsic name on the XCM pallet
    pub fn call_name(&self) -> &'static str {
        match self {
            TransferMethod::Teleport => "limitedTeleportAssets",
            TransferMethod::ReserveTransfer => "limitedReserveTransferAssets",
            TransferMethod::TransferAssets => "transferAssets",
        }
    }
}

/// Resolve the transfer method for a route
pub fn route(direction: Direction, kind: AssetKind) -> Result<TransferMethod> {
    use AssetKind::*;
    use ChainId::*;
    use TransferMethod::*;

    let method = match (direction.source, direction.dest, kind) {
        // The relay token is teleportable between the relay and system chains
        (Relay, Coretime, Fungible) | (Coretime, Relay, Fungible) => Some(Teleport),
        // The relay is the reserve for its token
        (Relay, Market, Fungible) | (Market, Relay, Fungible) => Some(ReserveTransfer),
        (Coretime, Market, Fungible) | (Market, Coretime, Fungible) => Some(TransferAssets),
        // The Coretime chain is the reserve for regions
        (Coretime, Market, Region) | (Market, Coretime, Region) => Some(ReserveTransfer),
        // The relay chain holds no regions
        (Relay, Coretime | Market, Region) | (Coretime | Market, Relay, Region) => None,
        (Relay, Relay, _) | (Coretime, Coretime, _) | (Market, Market, _) => None,
    };

    method.ok_or(Error::UnsupportedDirection { direction, kind })
}
