//! Consumer cart: reserved units tagged with the buffer they came from.

use serde::Serialize;

use agora_core::{ProducerId, ValueObject};

/// One reserved unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartEntry<P> {
    /// Buffer the unit goes back to if it is removed from the cart.
    pub producer_id: ProducerId,
    pub product: P,
}

/// Reserved units in order of addition.
#[derive(Debug)]
pub struct Cart<P> {
    entries: Vec<CartEntry<P>>,
    sold: u64,
}

impl<P> Default for Cart<P> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            sold: 0,
        }
    }
}

impl<P: ValueObject> Cart<P> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reserve(&mut self, producer_id: ProducerId, product: P) {
        self.entries.push(CartEntry {
            producer_id,
            product,
        });
    }

    /// Position of the first entry holding `product`.
    pub fn position(&self, product: &P) -> Option<usize> {
        self.entries.iter().position(|e| &e.product == product)
    }

    /// Remove the entry at `pos`, keeping the order of the rest.
    ///
    /// `pos` must come from `position` under the same lock.
    pub fn release_at(&mut self, pos: usize) -> CartEntry<P> {
        self.entries.remove(pos)
    }

    /// Empty the cart, returning the products in order of addition.
    pub fn drain(&mut self) -> Vec<P> {
        let products: Vec<P> = self.entries.drain(..).map(|e| e.product).collect();
        self.sold += products.len() as u64;
        products
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Units that left the system through `drain`.
    pub fn sold(&self) -> u64 {
        self.sold
    }

    pub fn entries(&self) -> &[CartEntry<P>] {
        &self.entries
    }
}
