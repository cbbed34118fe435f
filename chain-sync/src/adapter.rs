//! Chain adapter interface
//!
//! Everything that touches a live chain goes through [`ChainAdapter`]. Queries return
//! snapshots; submissions return a stream of [`TxEvent`]s that ends with a terminal event.

use crate::Result;
use async_trait::async_trait;
use region_core::{
    AccountId, BlockNumber, ChainId, CoreIndex, Hash, RegionId, RegionRecord, RenewalQuote,
    Timestamp,
};
use sale_engine::{SaleConfig, SaleInfo};
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::mpsc;
use xcm_transfer::VersionedMessage;

/// Lifecycle step an extrinsic has reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TxStep {
    /// Handed to the adapter, nothing heard back yet
    Submitted,
    /// Accepted into the transaction pool
    Ready,
    /// Included in a block
    InBlock,
    /// Included in a finalized block
    Finalized,
}

impl fmt::Display for TxStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TxStep::Submitted => write!(f, "submitted"),
            TxStep::Ready => write!(f, "ready"),
            TxStep::InBlock => write!(f, "in_block"),
            TxStep::Finalized => write!(f, "finalized"),
        }
    }
}

/// Status update for a submitted extrinsic
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxEvent {
    /// Accepted into the pool
    Ready,
    /// Included in block
    InBlock(Hash),
    /// Block finalized
    Finalized(Hash),
    /// Dispatch succeeded; carries the request commitment when the call emitted one
    Success {
        /// Commitment emitted by a record request
        commitment: Option<Hash>,
    },
    /// Dispatch failed on chain
    Fail(String),
    /// Transport or pool error
    Error(String),
}

/// A call to submit
#[derive(Debug, Clone)]
pub enum Extrinsic {
    /// Cross-chain asset transfer
    Transfer(VersionedMessage),
    /// Ask the market chain to fetch a region's record from the coretime chain
    RequestRegionRecord {
        /// Region whose record is requested
        region: RegionId,
    },
    /// Deliver the proven record for an outstanding request
    RespondToRequest {
        /// Request being answered
        commitment: Hash,
        /// Region the record belongs to
        region: RegionId,
        /// Record read from the coretime chain
        record: RegionRecord,
    },
    /// Settle a request whose timeout has passed
    TimeoutRequest {
        /// Request to settle
        commitment: Hash,
    },
}

impl Extrinsic {
    /// Call name, used in logs and metric labels
    pub fn name(&self) -> &'static str {
        match self {
            Extrinsic::Transfer(_) => "transfer",
            Extrinsic::RequestRegionRecord { .. } => "request_region_record",
            Extrinsic::RespondToRequest { .. } => "respond_to_request",
            Extrinsic::TimeoutRequest { .. } => "timeout_request",
        }
    }
}

/// Account that signs submissions; key handling is the adapter's concern
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signer {
    /// Signing account
    pub account: AccountId,
}

impl Signer {
    /// Signer for `account`
    pub fn new(account: AccountId) -> Self {
        Self { account }
    }
}

/// An outstanding record request on the market chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteRequest {
    /// Request commitment
    pub commitment: Hash,
    /// Region whose record was requested
    pub region: RegionId,
    /// Chain holding the record
    pub source: ChainId,
    /// Chain the record is delivered to
    pub dest: ChainId,
    /// Requester nonce folded into the commitment
    pub nonce: u64,
    /// Market-chain timestamp (ms) after which the request may be timed out
    pub timeout: Timestamp,
}

/// Access to the relay, coretime and market chains
#[async_trait]
pub trait ChainAdapter: Send + Sync {
    /// Latest block height of `chain`
    async fn block_height(&self, chain: ChainId) -> Result<BlockNumber>;

    /// Latest timestamp (ms) of `chain`
    async fn timestamp(&self, chain: ChainId) -> Result<Timestamp>;

    /// Region record held on `chain`, if any.
    ///
    /// The market chain holds a record only once one has been delivered to it.
    async fn region_record(&self, chain: ChainId, region: &RegionId) -> Result<Option<RegionRecord>>;

    /// Current holder of `region` on `chain`, if it is there
    async fn region_owner(&self, chain: ChainId, region: &RegionId) -> Result<Option<AccountId>>;

    /// Renewal quote for `core` on the coretime chain
    async fn renewal_quote(&self, core: CoreIndex) -> Result<Option<RenewalQuote>>;

    /// Outstanding record request on the market chain
    async fn remote_request(&self, commitment: &Hash) -> Result<Option<RemoteRequest>>;

    /// Record the market chain accepted in answer to `commitment`, if it was answered
    async fn request_answer(&self, commitment: &Hash) -> Result<Option<RegionRecord>>;

    /// Current sale on the coretime chain
    async fn sale_info(&self) -> Result<SaleInfo>;

    /// Broker configuration on the coretime chain
    async fn sale_config(&self) -> Result<SaleConfig>;

    /// Submit `extrinsic` to `chain`, signed by `signer`
    async fn submit(
        &self,
        chain: ChainId,
        extrinsic: Extrinsic,
        signer: &Signer,
    ) -> Result<mpsc::Receiver<TxEvent>>;
}
