//! Census of the registry.

use serde::Serialize;

/// Consistent snapshot of every buffer and cart.
///
/// Produced by `Marketplace::stats`, which holds all registry locks while
/// counting, so `buffered + reserved + sold == published` for every value
/// it returns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MarketStats {
    pub producers: usize,
    pub carts: usize,
    /// Units sitting in producer buffers.
    pub buffered: u64,
    /// Units sitting in carts.
    pub reserved: u64,
    /// Successful publishes since construction.
    pub published: u64,
    /// Units drained by `place_order`.
    pub sold: u64,
}

impl MarketStats {
    /// Conservation: nothing duplicated, nothing dropped.
    pub fn is_conserved(&self) -> bool {
        self.buffered + self.reserved + self.sold == self.published
    }
}
