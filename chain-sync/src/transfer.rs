//! Transfer submission
//!
//! Builds the transfer message, submits it on the source chain and, for regions, waits for
//! the destination to report the beneficiary as holder. At most one transfer per region may
//! be in flight.

use crate::{
    adapter::{ChainAdapter, Extrinsic, Signer},
    config::PollingConfig,
    inflight::InFlight,
    lifecycle::{submit_and_track, TxOutcome},
    metrics::VISIBILITY_CHECKS,
    Error, Result,
};
use backoff::{backoff::Backoff, ExponentialBackoff, ExponentialBackoffBuilder};
use region_core::{AccountId, Balance, ChainId, RegionId};
use std::sync::Arc;
use tracing::{debug, info, warn};
use xcm_transfer::{Direction, TransferAsset, TransferBuilder};

/// Completed region transfer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferReceipt {
    /// Submission outcome on the source chain
    pub outcome: TxOutcome,
    /// Holder reported by the destination
    pub owner: AccountId,
    /// Visibility checks it took
    pub attempts: u32,
}

/// Submits transfers and confirms their arrival
pub struct TransferCoordinator {
    adapter: Arc<dyn ChainAdapter>,
    builder: TransferBuilder,
    polling: PollingConfig,
    in_flight: InFlight,
}

impl std::fmt::Debug for TransferCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransferCoordinator")
            .field("polling", &self.polling)
            .field("in_flight", &self.in_flight.len())
            .finish()
    }
}

impl TransferCoordinator {
    /// Create a coordinator
    pub fn new(
        adapter: Arc<dyn ChainAdapter>,
        builder: TransferBuilder,
        polling: PollingConfig,
    ) -> Self {
        Self {
            adapter,
            builder,
            polling,
            in_flight: InFlight::new(),
        }
    }

    /// Whether a transfer of `region` is in flight
    pub fn is_in_flight(&self, region: &RegionId) -> bool {
        self.in_flight.contains(region)
    }

    /// Move relay-token `amount` along `direction`
    pub async fn transfer_funds(
        &self,
        direction: Direction,
        amount: Balance,
        beneficiary: AccountId,
        signer: &Signer,
    ) -> Result<TxOutcome> {
        let message =
            self.builder
                .build_transfer(direction, TransferAsset::Fungible(amount), beneficiary)?;

        info!("Transferring {} along {}", amount, direction);
        submit_and_track(
            self.adapter.as_ref(),
            direction.source,
            Extrinsic::Transfer(message),
            signer,
        )
        .await
    }

    /// Move `region` along `direction` and wait until the destination shows it owned by
    /// `beneficiary`
    pub async fn transfer_region(
        &self,
        direction: Direction,
        region: RegionId,
        beneficiary: AccountId,
        signer: &Signer,
    ) -> Result<TransferReceipt> {
        let _claim = self
            .in_flight
            .claim(region)
            .ok_or(Error::TransferInFlight(region))?;

        let message =
            self.builder
                .build_transfer(direction, TransferAsset::Region(region), beneficiary)?;

        info!("Transferring region {} along {}", region, direction);
        let outcome = submit_and_track(
            self.adapter.as_ref(),
            direction.source,
            Extrinsic::Transfer(message),
            signer,
        )
        .await?;

        let (owner, attempts) = self
            .await_visibility(direction.dest, region, beneficiary)
            .await?;

        info!(
            "Region {} visible on {} after {} checks",
            region, direction.dest, attempts
        );

        Ok(TransferReceipt {
            outcome,
            owner,
            attempts,
        })
    }

    fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoffBuilder::new()
            .with_initial_interval(self.polling.initial_backoff())
            .with_max_interval(self.polling.max_backoff())
            .with_multiplier(2.0)
            .with_randomization_factor(0.0)
            .with_max_elapsed_time(None)
            .build()
    }

    /// Poll `chain` until `region` is held by `owner`, giving up after the configured
    /// number of attempts
    async fn await_visibility(
        &self,
        chain: ChainId,
        region: RegionId,
        owner: AccountId,
    ) -> Result<(AccountId, u32)> {
        let mut backoff = self.backoff();
        let mut attempts = 0;

        loop {
            attempts += 1;

            match self.adapter.region_owner(chain, &region).await {
                Ok(Some(holder)) if holder == owner => {
                    VISIBILITY_CHECKS
                        .with_label_values(&[chain.name(), "visible"])
                        .inc();
                    return Ok((holder, attempts));
                }
                Ok(_) => {
                    VISIBILITY_CHECKS
                        .with_label_values(&[chain.name(), "missing"])
                        .inc();
                    debug!(
                        "Region {} not yet on {} (attempt {})",
                        region, chain, attempts
                    );
                }
                Err(e) if e.is_retryable() => {
                    VISIBILITY_CHECKS
                        .with_label_values(&[chain.name(), "error"])
                        .inc();
                    warn!("Visibility check for region {} failed: {}", region, e);
                }
                Err(e) => return Err(e),
            }

            if attempts >= self.polling.max_attempts {
                return Err(Error::Timeout {
                    attempts,
                    operation: format!("region {} arrival on {}", region, chain),
                });
            }

            match backoff.next_backoff() {
                Some(delay) => tokio::time::sleep(delay).await,
                None => {
                    return Err(Error::Timeout {
                        attempts,
                        operation: format!("region {} arrival on {}", region, chain),
                    })
                }
            }
        }
    }
}
