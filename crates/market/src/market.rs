//! The registry's call surface as a trait, so workers can run against the
//! real registry or a scripted stand-in.

use std::sync::Arc;

use agora_core::{CartId, MarketResult, ProducerId};

/// Operations producer and consumer workers call.
///
/// `publish` and `add_to_cart` return `Ok(false)` on an ordinary miss (full
/// buffer, no stock). Implementations must never block waiting for either.
pub trait Market<P>: Send + Sync {
    fn register_producer(&self) -> MarketResult<ProducerId>;
    fn new_cart(&self) -> MarketResult<CartId>;
    fn publish(&self, producer_id: ProducerId, product: P) -> MarketResult<bool>;
    fn add_to_cart(&self, cart_id: CartId, product: &P) -> MarketResult<bool>;
    fn remove_from_cart(&self, cart_id: CartId, product: &P) -> MarketResult<()>;
    fn place_order(&self, cart_id: CartId) -> MarketResult<Vec<P>>;
}

impl<P, M> Market<P> for Arc<M>
where
    M: Market<P> + ?Sized,
{
    fn register_producer(&self) -> MarketResult<ProducerId> {
        (**self).register_producer()
    }

    fn new_cart(&self) -> MarketResult<CartId> {
        (**self).new_cart()
    }

    fn publish(&self, producer_id: ProducerId, product: P) -> MarketResult<bool> {
        (**self).publish(producer_id, product)
    }

    fn add_to_cart(&self, cart_id: CartId, product: &P) -> MarketResult<bool> {
        (**self).add_to_cart(cart_id, product)
    }

    fn remove_from_cart(&self, cart_id: CartId, product: &P) -> MarketResult<()> {
        (**self).remove_from_cart(cart_id, product)
    }

    fn place_order(&self, cart_id: CartId) -> MarketResult<Vec<P>> {
        (**self).place_order(cart_id)
    }
}
