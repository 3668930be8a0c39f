//! Marketplace error model.

use thiserror::Error;

use crate::id::{CartId, ProducerId};

/// Result type used by every registry operation.
pub type MarketResult<T> = Result<T, MarketError>;

/// Marketplace-level error.
///
/// Capacity and availability misses are *not* errors: `publish` and
/// `add_to_cart` report them as `false`. This enum only carries usage
/// violations and broken internal state.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MarketError {
    /// The producer id was never handed out by this registry.
    #[error("unknown producer: {0}")]
    UnknownProducer(ProducerId),

    /// The cart id was never handed out by this registry.
    #[error("unknown cart: {0}")]
    UnknownCart(CartId),

    /// Buffer capacity must be at least one unit.
    #[error("invalid capacity: {0} (must be > 0)")]
    InvalidCapacity(usize),

    /// An identifier failed to parse.
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A thread panicked while holding registry state.
    #[error("registry lock poisoned")]
    Poisoned,
}

impl MarketError {
    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_offending_id() {
        let err = MarketError::UnknownProducer(ProducerId::new(7));
        assert_eq!(err.to_string(), "unknown producer: producer-7");

        let err = MarketError::UnknownCart(CartId::new(3));
        assert_eq!(err.to_string(), "unknown cart: cart-3");

        let err = MarketError::InvalidCapacity(0);
        assert_eq!(err.to_string(), "invalid capacity: 0 (must be > 0)");
    }
}
