//! Sequential identifiers handed out by the registry.
//!
//! Both id kinds are dense indices starting at 0. They are only minted by
//! `register_producer` / `new_cart`; `new` exists for tests and for callers
//! that persist ids in their own reports.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::MarketError;

/// Identifier of a producer buffer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProducerId(usize);

/// Identifier of a consumer cart.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartId(usize);

macro_rules! impl_seq_newtype {
    ($t:ty, $prefix:literal) => {
        impl $t {
            pub fn new(raw: usize) -> Self {
                Self(raw)
            }

            /// Position of the backing container in the registry tables.
            pub fn index(&self) -> usize {
                self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, concat!($prefix, "-{}"), self.0)
            }
        }

        impl From<$t> for usize {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        /// Accepts both the bare index (`"3"`) and the display form (`"cart-3"`).
        impl FromStr for $t {
            type Err = MarketError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let digits = s.strip_prefix(concat!($prefix, "-")).unwrap_or(s);
                let raw = digits
                    .parse::<usize>()
                    .map_err(|e| MarketError::invalid_id(format!("{}: {}", $prefix, e)))?;
                Ok(Self(raw))
            }
        }
    };
}

impl_seq_newtype!(ProducerId, "producer");
impl_seq_newtype!(CartId, "cart");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_and_prefixed_forms() {
        assert_eq!("4".parse::<ProducerId>().unwrap(), ProducerId::new(4));
        assert_eq!("producer-4".parse::<ProducerId>().unwrap(), ProducerId::new(4));
        assert_eq!("cart-0".parse::<CartId>().unwrap(), CartId::new(0));
    }

    #[test]
    fn rejects_foreign_prefix() {
        let err = "cart-1".parse::<ProducerId>().unwrap_err();
        assert!(matches!(err, MarketError::InvalidId(msg) if msg.starts_with("producer")));
    }

    #[test]
    fn serializes_as_plain_integer() {
        let json = serde_json::to_string(&CartId::new(12)).unwrap();
        assert_eq!(json, "12");
        let back: CartId = serde_json::from_str(&json).unwrap();
        assert_eq!(back.index(), 12);
    }
}
