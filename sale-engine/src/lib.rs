//! Bulk Coretime Sale Engine
//!
//! Phase state machine and price curve for bulk coretime sales.
//!
//! # Sale cycle

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]
//!
//! Every cycle is split into three phases, computed from four boundaries:
//!
//! 1. **Interlude** `[sale_start, interlude_end)`: no purchases; the prior cycle's sellout
//!    price is reported for information
//! 2. **Leadin** `[interlude_end, leadin_end)`: price decays from a multiple of the floor
//!    price down to the floor price
//! 3. **Regular** `[leadin_end, sale_end)`: fixed floor price until the ideal number of
//!    cores has been sold
//!
//! Phases are never stored: [`current_phase`] is a pure function of the boundaries, which
//! callers cache per cycle with [`BoundaryCache`].
//!
//! # Example
//!
//! ```no_run
//! use sale_engine::{Config, PriceEngine, SaleBoundaries, SaleConfig, SaleInfo};
//!
//! fn quote(info: &SaleInfo, sale_config: &SaleConfig, now: u32) -> sale_engine::Result<()> {
//!     let config = Config::default();
//!     let boundaries = SaleBoundaries::derive(info, sale_config, config.timing.blocks_per_timeslice)?;
//!     let engine = PriceEngine::from_config(&config)?;
//!
//!     match engine.current_price(info, &boundaries, now)? {
//!         Some(price) => println!("core price: {}", price),
//!         None => println!("no cores for sale right now"),
//!     }
//!     Ok(())
//! }
//! ```

#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod cache;
pub mod config;
pub mod error;
pub mod phase;
pub mod price;
pub mod renewal;
pub mod types;

// Re-exports
pub use cache::BoundaryCache;
pub use config::Config;
pub use error::{Error, Result};
pub use phase::{current_phase, SaleBoundaries, WallClockBoundaries};
pub use price::{LeadinCurve, LinearLeadin, PriceEngine, SaleState};
pub use renewal::{renewal_price, renewal_price_from_quote};
pub use types::*;
