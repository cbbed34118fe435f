//! Versioned transfer messages
//!
//! A [`TransferMessage`] is a fully resolved call on the sending chain's XCM pallet. It is
//! chain-agnostic data: the chain adapter turns [`VersionedMessage::call_args`] into an
//! extrinsic and signs it.

use crate::{
    asset::{Asset, Assets},
    direction::{AssetKind, Direction, TransferMethod},
    location::Location,
};
use region_core::ChainId;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Execution weight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Weight {
    /// Computation time
    pub ref_time: u64,
    /// Proof size in bytes
    pub proof_size: u64,
}

/// Weight policy for remote execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeightLimit {
    /// Buy as much weight as the fee allows
    Unlimited,
    /// Fail remote execution above this weight
    Limited(Weight),
}

/// Message format version
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum XcmVersion {
    /// Version 3
    #[default]
    V3,
    /// Version 4
    V4,
}

impl XcmVersion {
    fn tag(&self) -> &'static str {
        match self {
            XcmVersion::V3 => "V3",
            XcmVersion::V4 => "V4",
        }
    }
}

/// A resolved transfer call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferMessage {
    /// Chains involved
    pub direction: Direction,
    /// What is being moved
    pub asset_kind: AssetKind,
    /// Pallet method to call
    pub method: TransferMethod,
    /// Destination chain, relative to the sender
    pub dest: Location,
    /// Receiving account, relative to the destination
    pub beneficiary: Location,
    /// Assets, sorted
    pub assets: Assets,
    /// Index into `assets` of the asset paying for execution
    pub fee_asset_item: u32,
    /// Remote weight policy
    pub weight_limit: WeightLimit,
}

impl TransferMessage {
    /// XCM pallet name on the sending chain
    pub fn pallet(&self) -> &'static str {
        match self.direction.source {
            ChainId::Relay => "xcmPallet",
            ChainId::Coretime | ChainId::Market => "polkadotXcm",
        }
    }

    /// Full call name, `pallet.method`
    pub fn call_name(&self) -> String {
        format!("{}.{}", self.pallet(), self.method.call_name())
    }

    /// The asset paying for execution
    pub fn fee_asset(&self) -> Option<&Asset> {
        self.assets.as_slice().get(self.fee_asset_item as usize)
    }
}

/// A message tagged with the format version it is encoded for
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionedMessage {
    /// Format version
    pub version: XcmVersion,
    /// Message body
    pub message: TransferMessage,
}

impl VersionedMessage {
    /// Positional call arguments in the JSON shape chain RPC clients accept:
    /// `[dest, beneficiary, assets, fee_asset_item, weight_limit]`, with the first three
    /// wrapped in the version tag
    pub fn call_args(&self) -> serde_json::Result<Vec<Value>> {
        let tag = self.version.tag();
        let m = &self.message;

        Ok(vec![
            tagged(tag, serde_json::to_value(&m.dest)?),
            tagged(tag, serde_json::to_value(&m.beneficiary)?),
            tagged(tag, serde_json::to_value(&m.assets)?),
            json!(m.fee_asset_item),
            serde_json::to_value(m.weight_limit)?,
        ])
    }
}

fn tagged(tag: &str, value: Value) -> Value {
    let mut map = Map::new();
    map.insert(tag.to_string(), value);
    Value::Object(map)
}
