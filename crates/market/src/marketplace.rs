use std::sync::{Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, trace};

use agora_core::{CartId, MarketError, MarketResult, ProducerId, ValueObject};

use crate::buffer::ProducerBuffer;
use crate::cart::{Cart, CartEntry};
use crate::market::Market;
use crate::stats::MarketStats;

/// Shared registry of producer buffers and consumer carts.
///
/// Lock hierarchy, always taken top to bottom and never in reverse:
///
/// 1. `claim` (only by `add_to_cart` and `stats`)
/// 2. `carts` table
/// 3. `buffers` table
/// 4. one cart mutex (all of them, ascending, for `stats`)
/// 5. buffer mutexes, ascending id
///
/// The tables are only write-locked to append a new container, so id
/// allocation is the length of the table under its write lock: gap-free and
/// never reused.
#[derive(Debug)]
pub struct Marketplace<P> {
    capacity: usize,
    claim: Mutex<()>,
    carts: RwLock<Vec<Mutex<Cart<P>>>>,
    buffers: RwLock<Vec<Mutex<ProducerBuffer<P>>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MarketResult<MutexGuard<'_, T>> {
    mutex.lock().map_err(|_| MarketError::Poisoned)
}

fn read<T>(table: &RwLock<T>) -> MarketResult<RwLockReadGuard<'_, T>> {
    table.read().map_err(|_| MarketError::Poisoned)
}

fn write<T>(table: &RwLock<T>) -> MarketResult<RwLockWriteGuard<'_, T>> {
    table.write().map_err(|_| MarketError::Poisoned)
}

impl<P: ValueObject> Marketplace<P> {
    /// Create an empty registry whose buffers each hold at most `capacity`
    /// published units.
    pub fn new(capacity: usize) -> MarketResult<Self> {
        if capacity == 0 {
            return Err(MarketError::InvalidCapacity(capacity));
        }
        Ok(Self {
            capacity,
            claim: Mutex::new(()),
            carts: RwLock::new(Vec::new()),
            buffers: RwLock::new(Vec::new()),
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Allocate the next producer id together with its empty buffer.
    pub fn register_producer(&self) -> MarketResult<ProducerId> {
        let mut buffers = write(&self.buffers)?;
        let id = ProducerId::new(buffers.len());
        buffers.push(Mutex::new(ProducerBuffer::new()));
        debug!(producer_id = %id, "producer registered");
        Ok(id)
    }

    /// Allocate the next cart id together with its empty cart.
    pub fn new_cart(&self) -> MarketResult<CartId> {
        let mut carts = write(&self.carts)?;
        let id = CartId::new(carts.len());
        carts.push(Mutex::new(Cart::new()));
        debug!(cart_id = %id, "cart created");
        Ok(id)
    }

    /// Append `product` to the producer's buffer unless it is full.
    ///
    /// Only the target buffer is locked; publishers of different producers
    /// never wait on each other.
    pub fn publish(&self, producer_id: ProducerId, product: P) -> MarketResult<bool> {
        let buffers = read(&self.buffers)?;
        let slot = buffers
            .get(producer_id.index())
            .ok_or(MarketError::UnknownProducer(producer_id))?;
        let accepted = lock(slot)?.try_publish(product, self.capacity);
        trace!(producer_id = %producer_id, accepted, "publish");
        Ok(accepted)
    }

    /// Move one unit matching `product` from the first buffer (ascending
    /// producer id) that holds one into the cart.
    ///
    /// The scan is O(producers). It runs under `claim`, so the whole
    /// scan-and-take is a single step relative to every other `add_to_cart`
    /// and two carts can never claim the same unit. The destination cart is
    /// locked for the duration, so the unit is never observable in neither
    /// place.
    pub fn add_to_cart(&self, cart_id: CartId, product: &P) -> MarketResult<bool> {
        let _claim = lock(&self.claim)?;
        let carts = read(&self.carts)?;
        let buffers = read(&self.buffers)?;
        let slot = carts
            .get(cart_id.index())
            .ok_or(MarketError::UnknownCart(cart_id))?;
        let mut cart = lock(slot)?;

        for (idx, buffer) in buffers.iter().enumerate() {
            let mut buffer = lock(buffer)?;
            if let Some(unit) = buffer.take(product) {
                let producer_id = ProducerId::new(idx);
                cart.reserve(producer_id, unit);
                trace!(cart_id = %cart_id, producer_id = %producer_id, "unit claimed");
                return Ok(true);
            }
        }

        trace!(cart_id = %cart_id, ?product, "no matching unit");
        Ok(false)
    }

    /// Return the first cart entry matching `product` to the buffer it came
    /// from. Absent products are a no-op.
    ///
    /// The returned unit is accepted even if it pushes the buffer past
    /// capacity.
    pub fn remove_from_cart(&self, cart_id: CartId, product: &P) -> MarketResult<()> {
        let carts = read(&self.carts)?;
        let buffers = read(&self.buffers)?;
        let slot = carts
            .get(cart_id.index())
            .ok_or(MarketError::UnknownCart(cart_id))?;
        let mut cart = lock(slot)?;

        let Some(pos) = cart.position(product) else {
            trace!(cart_id = %cart_id, ?product, "nothing to remove");
            return Ok(());
        };
        let producer_id = cart.entries()[pos].producer_id;
        let origin = buffers
            .get(producer_id.index())
            .ok_or(MarketError::UnknownProducer(producer_id))?;
        let mut buffer = lock(origin)?;

        let entry = cart.release_at(pos);
        buffer.restore(entry.product);
        trace!(cart_id = %cart_id, producer_id = %producer_id, "unit returned");
        Ok(())
    }

    /// Drain the cart into an order: products in the order they were added.
    ///
    /// The products leave the registry. The cart stays valid and empty.
    pub fn place_order(&self, cart_id: CartId) -> MarketResult<Vec<P>> {
        let carts = read(&self.carts)?;
        let slot = carts
            .get(cart_id.index())
            .ok_or(MarketError::UnknownCart(cart_id))?;
        let products = lock(slot)?.drain();
        debug!(cart_id = %cart_id, items = products.len(), "order placed");
        Ok(products)
    }

    pub fn producer_count(&self) -> MarketResult<usize> {
        Ok(read(&self.buffers)?.len())
    }

    pub fn cart_count(&self) -> MarketResult<usize> {
        Ok(read(&self.carts)?.len())
    }

    pub fn buffer_len(&self, producer_id: ProducerId) -> MarketResult<usize> {
        let buffers = read(&self.buffers)?;
        let slot = buffers
            .get(producer_id.index())
            .ok_or(MarketError::UnknownProducer(producer_id))?;
        Ok(lock(slot)?.len())
    }

    pub fn cart_len(&self, cart_id: CartId) -> MarketResult<usize> {
        let carts = read(&self.carts)?;
        let slot = carts
            .get(cart_id.index())
            .ok_or(MarketError::UnknownCart(cart_id))?;
        Ok(lock(slot)?.len())
    }

    /// Copy of a buffer's units in publication order.
    pub fn buffer_snapshot(&self, producer_id: ProducerId) -> MarketResult<Vec<P>> {
        let buffers = read(&self.buffers)?;
        let slot = buffers
            .get(producer_id.index())
            .ok_or(MarketError::UnknownProducer(producer_id))?;
        Ok(lock(slot)?.units().to_vec())
    }

    /// Copy of a cart's entries in order of addition.
    pub fn cart_snapshot(&self, cart_id: CartId) -> MarketResult<Vec<CartEntry<P>>> {
        let carts = read(&self.carts)?;
        let slot = carts
            .get(cart_id.index())
            .ok_or(MarketError::UnknownCart(cart_id))?;
        Ok(lock(slot)?.entries().to_vec())
    }

    /// Count every unit in one consistent snapshot.
    ///
    /// Takes the full lock hierarchy, so it briefly stalls all workers.
    pub fn stats(&self) -> MarketResult<MarketStats> {
        let _claim = lock(&self.claim)?;
        let carts = read(&self.carts)?;
        let buffers = read(&self.buffers)?;
        let carts = carts
            .iter()
            .map(|c| lock(c))
            .collect::<MarketResult<Vec<_>>>()?;
        let buffers = buffers
            .iter()
            .map(|b| lock(b))
            .collect::<MarketResult<Vec<_>>>()?;

        Ok(MarketStats {
            producers: buffers.len(),
            carts: carts.len(),
            buffered: buffers.iter().map(|b| b.len() as u64).sum(),
            reserved: carts.iter().map(|c| c.len() as u64).sum(),
            published: buffers.iter().map(|b| b.published()).sum(),
            sold: carts.iter().map(|c| c.sold()).sum(),
        })
    }
}

impl<P: ValueObject + Send> Market<P> for Marketplace<P> {
    fn register_producer(&self) -> MarketResult<ProducerId> {
        Marketplace::register_producer(self)
    }

    fn new_cart(&self) -> MarketResult<CartId> {
        Marketplace::new_cart(self)
    }

    fn publish(&self, producer_id: ProducerId, product: P) -> MarketResult<bool> {
        Marketplace::publish(self, producer_id, product)
    }

    fn add_to_cart(&self, cart_id: CartId, product: &P) -> MarketResult<bool> {
        Marketplace::add_to_cart(self, cart_id, product)
    }

    fn remove_from_cart(&self, cart_id: CartId, product: &P) -> MarketResult<()> {
        Marketplace::remove_from_cart(self, cart_id, product)
    }

    fn place_order(&self, cart_id: CartId) -> MarketResult<Vec<P>> {
        Marketplace::place_order(self, cart_id)
    }
}
