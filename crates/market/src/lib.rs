//! Marketplace registry: per-producer bounded buffers and per-consumer carts
//! shared by any number of worker threads.
//!
//! Every operation is non-blocking in the "waiting for stock" sense: misses
//! come back as `false` and the caller decides how to back off.

pub mod buffer;
pub mod cart;
pub mod market;
pub mod marketplace;
pub mod stats;

pub use cart::CartEntry;
pub use market::Market;
pub use marketplace::Marketplace;
pub use stats::MarketStats;

pub use agora_core::{CartId, MarketError, MarketResult, ProducerId, ValueObject};
