//! Product catalogue traded on the marketplace.
//!
//! Pure data: products are immutable values compared by content.

pub mod product;

pub use product::{Catalogue, Product};
