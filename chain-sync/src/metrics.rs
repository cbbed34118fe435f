//! Prometheus metrics for chain synchronization

use lazy_static::lazy_static;
use prometheus::{
    register_counter_vec, register_histogram, register_histogram_vec, CounterVec, Histogram,
    HistogramVec,
};

lazy_static! {
    /// Total extrinsic submissions
    pub static ref SUBMISSION_TOTAL: CounterVec = register_counter_vec!(
        "chain_sync_submission_total",
        "Total extrinsic submissions",
        &["chain", "extrinsic", "outcome"]
    )
    .unwrap();

    /// Time from submission to terminal lifecycle event
    pub static ref SUBMISSION_DURATION: HistogramVec = register_histogram_vec!(
        "chain_sync_submission_duration_seconds",
        "Time from submission to terminal lifecycle event in seconds",
        &["chain", "extrinsic"]
    )
    .unwrap();

    /// Retrieval state transitions
    pub static ref RETRIEVAL_TRANSITIONS: CounterVec = register_counter_vec!(
        "chain_sync_retrieval_transitions_total",
        "Record retrieval state transitions",
        &["from", "to"]
    )
    .unwrap();

    /// Duration of one poll pass over all pending retrievals
    pub static ref POLL_DURATION: Histogram = register_histogram!(
        "chain_sync_poll_duration_seconds",
        "Duration of one retrieval poll pass in seconds"
    )
    .unwrap();

    /// Destination visibility checks after transfers
    pub static ref VISIBILITY_CHECKS: CounterVec = register_counter_vec!(
        "chain_sync_visibility_checks_total",
        "Destination visibility checks after transfers",
        &["chain", "result"]
    )
    .unwrap();
}
