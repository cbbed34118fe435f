//! Remote record retrieval
//!
//! A region held on the market chain has its authoritative record on the coretime chain.
//! [`RecordRetrieval`] requests the record through the market chain, then on each
//! [`advance`](RecordRetrieval::advance) observes the request and the source and either
//! answers the request, settles its timeout, adopts an outcome reached by someone else or
//! waits. Local state changes only after the remote call it depends on has succeeded, so a
//! failed submission can be retried by advancing again.
//!
//! Handles come from a [`RecordRetriever`], which allows one live handle per region.

use crate::{
    adapter::{ChainAdapter, Extrinsic, Signer},
    inflight::{Claim, InFlight},
    lifecycle::submit_and_track,
    machine::{decide, transition, Action, Observation, RetrievalState, Transition},
    metrics::RETRIEVAL_TRANSITIONS,
    Error, Result,
};
use region_core::{ChainId, Hash, RecordStatus, RegionId, RegionRecord};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Hands out retrieval handles, at most one per region at a time
#[derive(Clone)]
pub struct RecordRetriever {
    adapter: Arc<dyn ChainAdapter>,
    signer: Signer,
    tracked: InFlight,
}

impl std::fmt::Debug for RecordRetriever {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordRetriever")
            .field("signer", &self.signer)
            .field("tracked", &self.tracked.len())
            .finish()
    }
}

impl RecordRetriever {
    /// Retriever submitting as `signer`
    pub fn new(adapter: Arc<dyn ChainAdapter>, signer: Signer) -> Self {
        Self {
            adapter,
            signer,
            tracked: InFlight::new(),
        }
    }

    /// Whether a live handle tracks `region`
    pub fn is_tracked(&self, region: &RegionId) -> bool {
        self.tracked.contains(region)
    }

    /// Start tracking the record of `region`.
    ///
    /// With a known `commitment` the handle resumes the in-flight request; without one the
    /// record is unavailable until [`RecordRetrieval::request`] is called. Fails with
    /// [`Error::RequestInFlight`] while another handle tracks the region; dropping that
    /// handle releases it.
    pub fn retrieve_record(
        &self,
        region: RegionId,
        commitment: Option<Hash>,
    ) -> Result<RecordRetrieval> {
        let claim = self
            .tracked
            .claim(region)
            .ok_or(Error::RequestInFlight(region))?;

        let state = match commitment {
            Some(commitment) => RetrievalState::Pending { commitment },
            None => RetrievalState::Unrequested,
        };

        Ok(RecordRetrieval {
            adapter: Arc::clone(&self.adapter),
            signer: self.signer,
            region,
            state,
            _claim: claim,
        })
    }
}

/// Handle driving the retrieval of one region's record
pub struct RecordRetrieval {
    adapter: Arc<dyn ChainAdapter>,
    signer: Signer,
    region: RegionId,
    state: RetrievalState,
    _claim: Claim,
}

impl std::fmt::Debug for RecordRetrieval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordRetrieval")
            .field("region", &self.region)
            .field("state", &self.state)
            .finish()
    }
}

impl RecordRetrieval {
    /// Region whose record is retrieved
    pub fn region(&self) -> RegionId {
        self.region
    }

    /// Record availability
    pub fn status(&self) -> RecordStatus {
        self.state.status()
    }

    /// Full machine state
    pub fn state(&self) -> &RetrievalState {
        &self.state
    }

    /// Commitment of the in-flight request
    pub fn commitment(&self) -> Option<Hash> {
        self.state.commitment()
    }

    /// Delivered record, once available
    pub fn record(&self) -> Option<&RegionRecord> {
        match &self.state {
            RetrievalState::Available { record } => Some(record),
            _ => None,
        }
    }

    /// Submit a record request.
    ///
    /// Rejected while a request is already in flight; a second request for the same region
    /// would race the first.
    pub async fn request(&mut self) -> Result<Hash> {
        match &self.state {
            RetrievalState::Unrequested => {}
            RetrievalState::Pending { .. } | RetrievalState::TimedOut { .. } => {
                return Err(Error::RequestInFlight(self.region))
            }
            RetrievalState::Available { .. } => {
                return Err(Error::InvalidState(format!(
                    "record of region {} is already available",
                    self.region
                )))
            }
        }

        let outcome = submit_and_track(
            self.adapter.as_ref(),
            ChainId::Market,
            Extrinsic::RequestRegionRecord {
                region: self.region,
            },
            &self.signer,
        )
        .await?;

        let commitment = outcome.commitment.ok_or_else(|| Error::RemoteFailure {
            chain: ChainId::Market,
            extrinsic: "request_region_record".to_string(),
            step: outcome.step,
            reason: "no commitment emitted".to_string(),
        })?;

        self.apply(Transition::Requested(commitment))?;
        info!("Requested record of region {} (commitment {})", self.region, commitment);
        Ok(commitment)
    }

    /// Observe the chains once and act on what was seen
    pub async fn advance(&mut self) -> Result<RecordStatus> {
        let commitment = match self.state.commitment() {
            Some(c) => c,
            None => return Ok(self.status()),
        };

        let observation = self.observe(commitment).await?;

        match decide(&self.state, &observation) {
            Action::Wait => {
                debug!("Record of region {} still pending", self.region);
            }
            Action::Respond(record) => {
                self.submit(Extrinsic::RespondToRequest {
                    commitment,
                    region: self.region,
                    record: record.clone(),
                })
                .await?;
                self.apply(Transition::ResponseAccepted(record))?;
            }
            Action::SettleTimeout => {
                if matches!(self.state, RetrievalState::Pending { .. }) {
                    self.apply(Transition::TimeoutDetected)?;
                }
                self.submit(Extrinsic::TimeoutRequest { commitment }).await?;
                self.apply(Transition::TimeoutSettled)?;
            }
            Action::Adopt(record) => {
                info!(
                    "Request {} for region {} was answered elsewhere",
                    commitment, self.region
                );
                self.apply(Transition::ResponseAccepted(record))?;
            }
            Action::Forget => {
                info!(
                    "Request {} for region {} is no longer outstanding",
                    commitment, self.region
                );
                self.apply(Transition::RequestVanished)?;
            }
        }

        Ok(self.status())
    }

    async fn observe(&self, commitment: Hash) -> Result<Observation> {
        let request = match self.adapter.remote_request(&commitment).await? {
            Some(r) => r,
            None => {
                let answer = self.adapter.request_answer(&commitment).await?;
                return Ok(Observation::Resolved { answer });
            }
        };

        if let Some(record) = self.adapter.region_record(ChainId::Coretime, &self.region).await? {
            return Ok(Observation::Found(record));
        }

        let now = self.adapter.timestamp(ChainId::Market).await?;
        Ok(Observation::NotFound {
            now,
            timeout: request.timeout,
        })
    }

    async fn submit(&self, extrinsic: Extrinsic) -> Result<()> {
        let name = extrinsic.name();
        submit_and_track(self.adapter.as_ref(), ChainId::Market, extrinsic, &self.signer)
            .await
            .map(|_| ())
            .map_err(|e| {
                warn!(
                    "{} for region {} failed, staying {}: {}",
                    name, self.region, self.state, e
                );
                e
            })
    }

    fn apply(&mut self, t: Transition) -> Result<()> {
        let next = transition(&self.state, t)?;
        info!(
            "Region {} record retrieval {} -> {}",
            self.region, self.state, next
        );
        RETRIEVAL_TRANSITIONS
            .with_label_values(&[self.state.name(), next.name()])
            .inc();
        self.state = next;
        Ok(())
    }
}
