//! Coretime Chain Synchronization
//!
//! Keeps regions consistent across the relay, coretime and market chains:
//! - Chain adapter contract for queries and extrinsic submission
//! - Transaction lifecycle tracking down to a single terminal outcome
//! - Region and balance transfers with per-region in-flight protection
//! - Remote record retrieval as an explicit state machine
//! - Interval poller reporting retrieval progress over a channel
//! - Sale and renewal prices read from the coretime chain
//! - Observability via Prometheus metrics
//!
//! ## Flow
//!
//! ```text
//! poll tick ──► RecordRetrieval::advance ──► machine::decide ──► submit ──► machine::transition
//!                                                                              │
//!                                              RetrievalEvent ◄────────────────┘
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod adapter;
pub mod config;
pub mod error;
pub mod inflight;
pub mod lifecycle;
pub mod machine;
pub mod memory;
pub mod metrics;
pub mod poller;
pub mod retrieval;
pub mod sale;
pub mod transfer;

pub use adapter::{ChainAdapter, Extrinsic, RemoteRequest, Signer, TxEvent, TxStep};
pub use config::Config;
pub use error::{Error, Result};
pub use inflight::{Claim, InFlight};
pub use lifecycle::{submit_and_track, TxOutcome};
pub use machine::{Action, Observation, RetrievalState, Transition};
pub use memory::InMemoryAdapter;
pub use poller::{spawn_retrieval_poller, PollerHandles, RetrievalEvent};
pub use retrieval::{RecordRetrieval, RecordRetriever};
pub use sale::SaleTracker;
pub use transfer::{TransferCoordinator, TransferReceipt};
