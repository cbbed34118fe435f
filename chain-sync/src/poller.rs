//! Retrieval poll loop
//!
//! Advances every pending [`RecordRetrieval`] on a fixed interval and reports what changed
//! on a channel. The loop ends when it is cancelled or when nothing is left pending; either
//! way the handles are returned to the caller. Handles are advanced concurrently, so no two
//! of them may share a region or a commitment.

use crate::{metrics::POLL_DURATION, retrieval::RecordRetrieval, Error, Result};
use futures::future::join_all;
use region_core::{ErrorKind, RecordStatus, RegionId, RegionRecord};
use std::collections::HashSet;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Buffered events before the poller waits on the consumer
const EVENT_BUFFER: usize = 64;

/// Something the poller observed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetrievalEvent {
    /// A region's record status changed
    StatusChanged {
        /// Region
        region: RegionId,
        /// Previous status
        from: RecordStatus,
        /// New status
        to: RecordStatus,
    },
    /// A region's record was delivered
    RecordAvailable {
        /// Region
        region: RegionId,
        /// Delivered record
        record: RegionRecord,
    },
    /// Advancing a retrieval failed
    Failed {
        /// Region
        region: RegionId,
        /// Error class
        kind: ErrorKind,
        /// Error message
        message: String,
    },
}

/// Task handle yielding the retrieval handles, and the event stream
pub type PollerHandles = (JoinHandle<Vec<RecordRetrieval>>, mpsc::Receiver<RetrievalEvent>);

/// Start polling `handles` every `period`.
///
/// Returns the task handle (yielding the handles when the loop ends) and the event stream.
/// Two handles for one region or one commitment are rejected with
/// [`Error::RequestInFlight`].
pub fn spawn_retrieval_poller(
    handles: Vec<RecordRetrieval>,
    period: Duration,
    cancel: CancellationToken,
) -> Result<PollerHandles> {
    let mut regions = HashSet::new();
    let mut commitments = HashSet::new();
    for handle in &handles {
        let duplicate = !regions.insert(handle.region())
            || handle.commitment().map_or(false, |c| !commitments.insert(c));
        if duplicate {
            return Err(Error::RequestInFlight(handle.region()));
        }
    }

    let (tx, rx) = mpsc::channel(EVENT_BUFFER);
    let task = tokio::spawn(run_poll_loop(handles, period, tx, cancel));
    Ok((task, rx))
}

async fn run_poll_loop(
    mut handles: Vec<RecordRetrieval>,
    period: Duration,
    events: mpsc::Sender<RetrievalEvent>,
    cancel: CancellationToken,
) -> Vec<RecordRetrieval> {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    info!(
        "Retrieval poller started for {} regions every {:?}",
        handles.len(),
        period
    );

    loop {
        if !handles.iter().any(|h| h.status() == RecordStatus::Pending) {
            info!("No pending retrievals left, poller stopping");
            break;
        }

        tokio::select! {
            _ = cancel.cancelled() => {
                info!("Retrieval poller cancelled");
                break;
            }
            _ = ticker.tick() => {
                if !poll_once(&mut handles, &events).await {
                    warn!("Event receiver dropped, poller stopping");
                    break;
                }
            }
        }
    }

    handles
}

/// Advance every pending handle once; false if the event receiver is gone
async fn poll_once(handles: &mut [RecordRetrieval], events: &mpsc::Sender<RetrievalEvent>) -> bool {
    let start = Instant::now();

    let pending: Vec<&mut RecordRetrieval> = handles
        .iter_mut()
        .filter(|h| h.status() == RecordStatus::Pending)
        .collect();

    debug!("Polling {} pending retrievals", pending.len());

    let results = join_all(pending.into_iter().map(|handle| async move {
        let before = handle.status();
        let result = handle.advance().await;
        (handle.region(), before, result, handle.record().cloned())
    }))
    .await;

    POLL_DURATION.observe(start.elapsed().as_secs_f64());

    for (region, before, result, record) in results {
        let event = match result {
            Ok(after) if after == before => continue,
            Ok(after) => match record {
                Some(record) => RetrievalEvent::RecordAvailable { region, record },
                None => RetrievalEvent::StatusChanged {
                    region,
                    from: before,
                    to: after,
                },
            },
            Err(e) => RetrievalEvent::Failed {
                region,
                kind: e.kind(),
                message: e.to_string(),
            },
        };

        if events.send(event).await.is_err() {
            return false;
        }
    }

    true
}
