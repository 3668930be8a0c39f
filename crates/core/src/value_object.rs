//! Value object trait: equality by value, not identity.
//!
//! Products traded through the marketplace are value objects. Two units of
//! the same product are interchangeable, which is what lets `add_to_cart`
//! claim *any* matching unit from *any* buffer.

/// Marker trait for values that can be traded.
///
/// ## Requirements
///
/// - **Clone**: a product is copied into the cart entry and into order output.
/// - **PartialEq**: buffers and carts are searched by value.
/// - **Debug**: units show up in logs and test failures.
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq)]
/// struct Tea { name: String }
///
/// impl ValueObject for Tea {}
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}

impl ValueObject for String {}
impl ValueObject for &'static str {}
