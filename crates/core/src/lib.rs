//! `agora-core`: shared building blocks for the marketplace.
//!
//! Identifiers, the product value-object contract and the error model. No
//! synchronization or IO lives here.

pub mod error;
pub mod id;
pub mod value_object;

pub use error::{MarketError, MarketResult};
pub use id::{CartId, ProducerId};
pub use value_object::ValueObject;
