//! Transaction lifecycle tracking
//!
//! Folds an adapter's event stream into one terminal outcome. The stream must end in
//! `Success`, `Fail` or `Error`; a stream that closes early is a failure at the last step
//! reached.

use crate::{
    adapter::{ChainAdapter, Extrinsic, Signer, TxEvent, TxStep},
    metrics::{SUBMISSION_DURATION, SUBMISSION_TOTAL},
    Error, Result,
};
use region_core::{ChainId, Hash};
use std::time::Instant;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Successful submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxOutcome {
    /// Last step reached before success
    pub step: TxStep,
    /// Block the extrinsic was included in
    pub block: Option<Hash>,
    /// Commitment emitted by the call, if any
    pub commitment: Option<Hash>,
}

/// Drain `events` until a terminal event
pub async fn track(
    chain: ChainId,
    extrinsic: &str,
    mut events: mpsc::Receiver<TxEvent>,
) -> Result<TxOutcome> {
    let mut step = TxStep::Submitted;
    let mut block = None;

    let failure = |step: TxStep, reason: String| Error::RemoteFailure {
        chain,
        extrinsic: extrinsic.to_string(),
        step,
        reason,
    };

    while let Some(event) = events.recv().await {
        match event {
            TxEvent::Ready => step = step.max(TxStep::Ready),
            TxEvent::InBlock(hash) => {
                step = step.max(TxStep::InBlock);
                block = Some(hash);
                debug!("{} on {} included in block {}", extrinsic, chain, hash);
            }
            TxEvent::Finalized(hash) => {
                step = TxStep::Finalized;
                block = Some(hash);
            }
            TxEvent::Success { commitment } => {
                return Ok(TxOutcome {
                    step,
                    block,
                    commitment,
                })
            }
            TxEvent::Fail(reason) | TxEvent::Error(reason) => return Err(failure(step, reason)),
        }
    }

    Err(failure(step, "event stream closed before a terminal event".to_string()))
}

/// Submit `extrinsic` and wait for its terminal outcome
pub async fn submit_and_track(
    adapter: &dyn ChainAdapter,
    chain: ChainId,
    extrinsic: Extrinsic,
    signer: &Signer,
) -> Result<TxOutcome> {
    let start = Instant::now();
    let name = extrinsic.name();

    info!("Submitting {} to {}", name, chain);

    let result = match adapter.submit(chain, extrinsic, signer).await {
        Ok(events) => track(chain, name, events).await,
        Err(e) => Err(e),
    };

    SUBMISSION_DURATION
        .with_label_values(&[chain.name(), name])
        .observe(start.elapsed().as_secs_f64());

    let outcome = if result.is_ok() { "success" } else { "failure" };
    SUBMISSION_TOTAL
        .with_label_values(&[chain.name(), name, outcome])
        .inc();

    match &result {
        Ok(o) => info!("{} on {} succeeded at step {}", name, chain, o.step),
        Err(e) => warn!("{} on {} failed: {}", name, chain, e),
    }

    result
}
