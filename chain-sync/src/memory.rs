//! Loopback chain adapter
//!
//! Keeps all three chains in one process. The coretime chain holds region records; the
//! market chain only knows who holds a region until a record request for it is answered.
//! Transfers move holdership between the two, record requests get blake3 commitments, and
//! responses are checked against the coretime chain's copy of the record. Failures and
//! delayed visibility can be injected for tests.

use crate::{
    adapter::{ChainAdapter, Extrinsic, RemoteRequest, Signer, TxEvent, TxStep},
    Error, Result,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use region_core::{
    AccountId, BlockNumber, ChainId, CoreIndex, Hash, RegionId, RegionRecord, RenewalQuote,
    Timestamp,
};
use sale_engine::{SaleConfig, SaleInfo};
use std::collections::{HashMap, VecDeque};
use tokio::sync::mpsc;
use tracing::debug;
use xcm_transfer::{AssetInstance, Fungibility, Junction, TransferConfig, TransferMessage};

/// Default request lifetime on the market chain (ms)
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 60_000;

/// Account a parachain holds on its siblings
pub fn sibling_account(para_id: u32) -> AccountId {
    let mut bytes = [0u8; 32];
    bytes[..4].copy_from_slice(b"sibl");
    bytes[4..8].copy_from_slice(&para_id.to_le_bytes());
    AccountId::new(bytes)
}

#[derive(Debug, Default)]
struct ChainState {
    height: BlockNumber,
    timestamp: Timestamp,
    /// Records: authoritative on the coretime chain, delivered ones on the market chain
    regions: HashMap<RegionId, RegionRecord>,
    /// Market-chain holders
    holders: HashMap<RegionId, AccountId>,
    hidden: HashMap<RegionId, u32>,
}

impl ChainState {
    fn owner(&self, chain: ChainId, region: &RegionId) -> Option<AccountId> {
        match chain {
            ChainId::Coretime => self.regions.get(region).map(|r| r.owner),
            ChainId::Market => self.holders.get(region).copied(),
            ChainId::Relay => None,
        }
    }
}

#[derive(Debug)]
struct InjectedFailure {
    after: TxStep,
    reason: String,
}

#[derive(Debug)]
struct MemoryState {
    chains: HashMap<ChainId, ChainState>,
    requests: HashMap<Hash, RemoteRequest>,
    responses: HashMap<Hash, RegionRecord>,
    quotes: HashMap<CoreIndex, RenewalQuote>,
    sale: Option<(SaleInfo, SaleConfig)>,
    failures: VecDeque<InjectedFailure>,
    submissions: Vec<(ChainId, &'static str)>,
    request_timeout_ms: u64,
    nonce: u64,
    market_para_id: u32,
}

impl MemoryState {
    fn chain(&mut self, chain: ChainId) -> &mut ChainState {
        self.chains.entry(chain).or_default()
    }

    /// Apply a successful dispatch; `Err` is an on-chain dispatch failure
    fn dispatch(
        &mut self,
        chain: ChainId,
        extrinsic: &Extrinsic,
    ) -> std::result::Result<Option<Hash>, String> {
        match extrinsic {
            Extrinsic::Transfer(versioned) => {
                self.apply_transfer(chain, &versioned.message)?;
                Ok(None)
            }
            Extrinsic::RequestRegionRecord { region } => {
                if chain != ChainId::Market {
                    return Err(format!("record requests are not supported on {}", chain));
                }
                self.nonce += 1;
                let mut preimage = region.encode().to_le_bytes().to_vec();
                preimage.extend_from_slice(&self.nonce.to_le_bytes());
                let commitment = Hash::digest(&preimage);
                let timeout = self.chain(ChainId::Market).timestamp + self.request_timeout_ms;

                self.requests.insert(
                    commitment,
                    RemoteRequest {
                        commitment,
                        region: *region,
                        source: ChainId::Coretime,
                        dest: ChainId::Market,
                        nonce: self.nonce,
                        timeout,
                    },
                );
                Ok(Some(commitment))
            }
            Extrinsic::RespondToRequest {
                commitment,
                region,
                record,
            } => {
                let requested = self
                    .requests
                    .get(commitment)
                    .map(|r| r.region)
                    .ok_or_else(|| format!("unknown request {}", commitment))?;
                if requested != *region {
                    return Err(format!("request {} is for another region", commitment));
                }
                let source = self.chain(ChainId::Coretime).regions.get(region);
                if source != Some(record) {
                    return Err(format!("record proof for region {} does not verify", region));
                }
                self.requests.remove(commitment);
                self.responses.insert(*commitment, record.clone());

                let market = self.chain(ChainId::Market);
                let mut delivered = record.clone();
                if let Some(holder) = market.holders.get(region) {
                    delivered.owner = *holder;
                }
                market.regions.insert(*region, delivered);
                Ok(None)
            }
            Extrinsic::TimeoutRequest { commitment } => {
                let timeout = self
                    .requests
                    .get(commitment)
                    .map(|r| r.timeout)
                    .ok_or_else(|| format!("unknown request {}", commitment))?;
                let now = self.chain(ChainId::Market).timestamp;
                if now <= timeout {
                    return Err(format!(
                        "request {} has not timed out ({} <= {})",
                        commitment, now, timeout
                    ));
                }
                self.requests.remove(commitment);
                Ok(None)
            }
        }
    }

    fn apply_transfer(
        &mut self,
        chain: ChainId,
        message: &TransferMessage,
    ) -> std::result::Result<(), String> {
        if message.direction.source != chain {
            return Err(format!(
                "message for {} submitted to {}",
                message.direction, chain
            ));
        }

        let index = message.assets.as_slice().iter().find_map(|a| match a.fun {
            Fungibility::NonFungible(AssetInstance::Index(index)) => Some(index),
            Fungibility::Fungible(_) => None,
        });
        let Some(index) = index else {
            // Balances are not tracked
            return Ok(());
        };

        let region = RegionId::decode(index).map_err(|e| e.to_string())?;
        let beneficiary = message
            .beneficiary
            .interior
            .as_slice()
            .iter()
            .find_map(|j| match j {
                Junction::AccountId32 { id } => Some(*id),
                _ => None,
            })
            .ok_or_else(|| "beneficiary is not an account".to_string())?;

        let source = message.direction.source;
        let dest = message.direction.dest;

        if self.chain(source).owner(source, &region).is_none() {
            return Err(format!("region {} is not held on {}", region, source));
        }

        let new_coretime_owner = match (source, dest) {
            // The coretime chain keeps the record under the market chain's account
            (ChainId::Coretime, ChainId::Market) => sibling_account(self.market_para_id),
            (ChainId::Market, ChainId::Coretime) => beneficiary,
            _ => return Err(format!("regions cannot move along {}", message.direction)),
        };

        let record = self
            .chain(ChainId::Coretime)
            .regions
            .get_mut(&region)
            .ok_or_else(|| format!("region {} has no record on the coretime chain", region))?;
        record.owner = new_coretime_owner;

        let market = self.chain(ChainId::Market);
        // A record delivered before the move is stale afterwards
        market.regions.remove(&region);
        if dest == ChainId::Market {
            market.holders.insert(region, beneficiary);
        } else {
            market.holders.remove(&region);
        }

        Ok(())
    }
}

/// In-process adapter for the relay, coretime and market chains
#[derive(Debug)]
pub struct InMemoryAdapter {
    state: Mutex<MemoryState>,
}

impl Default for InMemoryAdapter {
    fn default() -> Self {
        Self::new(&TransferConfig::default())
    }
}

impl InMemoryAdapter {
    /// Create empty chains using the para ids from `config`
    pub fn new(config: &TransferConfig) -> Self {
        Self {
            state: Mutex::new(MemoryState {
                chains: HashMap::new(),
                requests: HashMap::new(),
                responses: HashMap::new(),
                quotes: HashMap::new(),
                sale: None,
                failures: VecDeque::new(),
                submissions: Vec::new(),
                request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
                nonce: 0,
                market_para_id: config.chains.market_para_id,
            }),
        }
    }

    /// Set a chain's head
    pub fn set_head(&self, chain: ChainId, height: BlockNumber, timestamp: Timestamp) {
        let mut state = self.state.lock();
        let c = state.chain(chain);
        c.height = height;
        c.timestamp = timestamp;
    }

    /// Produce `blocks` blocks on `chain`, `block_time_ms` apart
    pub fn advance(&self, chain: ChainId, blocks: BlockNumber, block_time_ms: u64) {
        let mut state = self.state.lock();
        let c = state.chain(chain);
        c.height += blocks;
        c.timestamp += blocks as u64 * block_time_ms;
    }

    /// Place a region on `chain`.
    ///
    /// The market chain only learns that `record.owner` holds the region; its record has to
    /// be retrieved.
    pub fn insert_region(&self, chain: ChainId, region: RegionId, record: RegionRecord) {
        let mut state = self.state.lock();
        let c = state.chain(chain);
        match chain {
            ChainId::Market => {
                c.holders.insert(region, record.owner);
            }
            ChainId::Relay | ChainId::Coretime => {
                c.regions.insert(region, record);
            }
        }
    }

    /// Drop a region from `chain`
    pub fn remove_region(&self, chain: ChainId, region: &RegionId) {
        let mut state = self.state.lock();
        let c = state.chain(chain);
        c.regions.remove(region);
        c.holders.remove(region);
    }

    /// Hide `region`'s holder on `chain` from the next `queries` owner queries
    pub fn delay_visibility(&self, chain: ChainId, region: RegionId, queries: u32) {
        self.state.lock().chain(chain).hidden.insert(region, queries);
    }

    /// Publish a sale
    pub fn set_sale(&self, info: SaleInfo, config: SaleConfig) {
        self.state.lock().sale = Some((info, config));
    }

    /// Publish a renewal quote
    pub fn set_renewal_quote(&self, core: CoreIndex, quote: RenewalQuote) {
        self.state.lock().quotes.insert(core, quote);
    }

    /// Lifetime of new record requests (ms)
    pub fn set_request_timeout(&self, millis: u64) {
        self.state.lock().request_timeout_ms = millis;
    }

    /// Fail the next submission once it has reached `after`
    pub fn fail_next_submission(&self, after: TxStep, reason: impl Into<String>) {
        self.state.lock().failures.push_back(InjectedFailure {
            after,
            reason: reason.into(),
        });
    }

    /// Submitted extrinsics, in order
    pub fn submissions(&self) -> Vec<(ChainId, &'static str)> {
        self.state.lock().submissions.clone()
    }

    /// Whether `commitment` is still outstanding
    pub fn has_request(&self, commitment: &Hash) -> bool {
        self.state.lock().requests.contains_key(commitment)
    }
}

fn block_hash(chain: ChainId, height: BlockNumber) -> Hash {
    let mut preimage = chain.name().as_bytes().to_vec();
    preimage.extend_from_slice(&height.to_le_bytes());
    Hash::digest(&preimage)
}

#[async_trait]
impl ChainAdapter for InMemoryAdapter {
    async fn block_height(&self, chain: ChainId) -> Result<BlockNumber> {
        Ok(self.state.lock().chain(chain).height)
    }

    async fn timestamp(&self, chain: ChainId) -> Result<Timestamp> {
        Ok(self.state.lock().chain(chain).timestamp)
    }

    async fn region_record(&self, chain: ChainId, region: &RegionId) -> Result<Option<RegionRecord>> {
        Ok(self.state.lock().chain(chain).regions.get(region).cloned())
    }

    async fn region_owner(&self, chain: ChainId, region: &RegionId) -> Result<Option<AccountId>> {
        let mut state = self.state.lock();
        let c = state.chain(chain);

        if let Some(remaining) = c.hidden.get_mut(region) {
            if *remaining > 0 {
                *remaining -= 1;
                return Ok(None);
            }
        }

        Ok(c.owner(chain, region))
    }

    async fn renewal_quote(&self, core: CoreIndex) -> Result<Option<RenewalQuote>> {
        Ok(self.state.lock().quotes.get(&core).cloned())
    }

    async fn remote_request(&self, commitment: &Hash) -> Result<Option<RemoteRequest>> {
        Ok(self.state.lock().requests.get(commitment).copied())
    }

    async fn request_answer(&self, commitment: &Hash) -> Result<Option<RegionRecord>> {
        Ok(self.state.lock().responses.get(commitment).cloned())
    }

    async fn sale_info(&self) -> Result<SaleInfo> {
        self.state
            .lock()
            .sale
            .as_ref()
            .map(|(info, _)| info.clone())
            .ok_or_else(|| Error::NotFound("no sale published".to_string()))
    }

    async fn sale_config(&self) -> Result<SaleConfig> {
        self.state
            .lock()
            .sale
            .as_ref()
            .map(|(_, config)| config.clone())
            .ok_or_else(|| Error::NotFound("no sale configuration published".to_string()))
    }

    async fn submit(
        &self,
        chain: ChainId,
        extrinsic: Extrinsic,
        signer: &Signer,
    ) -> Result<mpsc::Receiver<TxEvent>> {
        let mut state = self.state.lock();
        state.submissions.push((chain, extrinsic.name()));

        let c = state.chain(chain);
        c.height += 1;
        let block = block_hash(chain, c.height);

        let events = match state.failures.pop_front() {
            Some(failure) => {
                let mut events = Vec::new();
                if failure.after >= TxStep::Ready {
                    events.push(TxEvent::Ready);
                }
                if failure.after >= TxStep::InBlock {
                    events.push(TxEvent::InBlock(block));
                }
                if failure.after >= TxStep::Finalized {
                    events.push(TxEvent::Finalized(block));
                }
                events.push(match failure.after {
                    TxStep::Submitted => TxEvent::Error(failure.reason),
                    _ => TxEvent::Fail(failure.reason),
                });
                events
            }
            None => match state.dispatch(chain, &extrinsic) {
                Ok(commitment) => vec![
                    TxEvent::Ready,
                    TxEvent::InBlock(block),
                    TxEvent::Finalized(block),
                    TxEvent::Success { commitment },
                ],
                Err(reason) => vec![TxEvent::Ready, TxEvent::InBlock(block), TxEvent::Fail(reason)],
            },
        };
        drop(state);

        debug!(
            "{} from {} on {}: {} events",
            extrinsic.name(),
            signer.account,
            chain,
            events.len()
        );

        let (tx, rx) = mpsc::channel(events.len());
        for event in events {
            if tx.try_send(event).is_err() {
                break;
            }
        }
        Ok(rx)
    }
}
