//! # Cross-Chain Transfer Messages
//!
//! Builds versioned asset-transfer messages between the relay chain, the Coretime chain and
//! the Market chain:
//! - Relative locations for destinations, beneficiaries and assets
//! - Fungible (relay token) and non-fungible (region) assets
//! - An exhaustive route table over `(source, destination, asset kind)`
//! - Fee-asset selection after canonical asset ordering
//!
//! ## Directions
//!
//! ```text
//!              ┌──────────────┐
//!              │    Relay     │
//!              └──┬────────┬──┘
//!       teleport  │        │  reserve
//!         ┌───────▼──┐  ┌──▼────────┐
//!         │ Coretime │◄─►  Market   │
//!         └──────────┘  └───────────┘
//!           regions: reserve transfer
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

pub mod asset;
pub mod builder;
pub mod config;
pub mod direction;
pub mod error;
pub mod location;
pub mod message;

pub use asset::{Asset, AssetInstance, Assets, Fungibility};
pub use builder::TransferBuilder;
pub use config::TransferConfig;
pub use direction::{route, AssetKind, Direction, TransferAsset, TransferMethod};
pub use error::{Error, Result};
pub use location::{Junction, Junctions, Location};
pub use message::{TransferMessage, VersionedMessage, Weight, WeightLimit, XcmVersion};
