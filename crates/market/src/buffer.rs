//! Producer buffer: the bounded holding area behind one producer id.

use agora_core::ValueObject;

/// Published, unsold units of a single producer, in publication order.
///
/// The capacity bound is enforced by `try_publish` only. Units coming back
/// from a cart go through `restore`, which never refuses.
#[derive(Debug)]
pub struct ProducerBuffer<P> {
    units: Vec<P>,
    published: u64,
}

impl<P> Default for ProducerBuffer<P> {
    fn default() -> Self {
        Self {
            units: Vec::new(),
            published: 0,
        }
    }
}

impl<P: ValueObject> ProducerBuffer<P> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `product` if fewer than `capacity` units are held.
    pub fn try_publish(&mut self, product: P, capacity: usize) -> bool {
        if self.units.len() >= capacity {
            return false;
        }
        self.units.push(product);
        self.published += 1;
        true
    }

    /// Remove and return the first unit equal to `product`.
    pub fn take(&mut self, product: &P) -> Option<P> {
        let pos = self.units.iter().position(|unit| unit == product)?;
        Some(self.units.remove(pos))
    }

    /// Put a unit released from a cart back, ignoring capacity.
    pub fn restore(&mut self, product: P) {
        self.units.push(product);
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Number of successful publishes over the buffer's lifetime.
    pub fn published(&self) -> u64 {
        self.published
    }

    pub fn units(&self) -> &[P] {
        &self.units
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publish_stops_at_capacity() {
        let mut buffer = ProducerBuffer::new();
        assert!(buffer.try_publish("tea", 2));
        assert!(buffer.try_publish("tea", 2));
        assert!(!buffer.try_publish("tea", 2));
        assert_eq!(buffer.len(), 2);
        assert_eq!(buffer.published(), 2);
    }

    #[test]
    fn take_removes_first_match_and_keeps_order() {
        let mut buffer = ProducerBuffer::new();
        for p in ["tea", "coffee", "tea", "mate"] {
            buffer.try_publish(p, 10);
        }
        assert_eq!(buffer.take(&"tea"), Some("tea"));
        assert_eq!(buffer.units(), &["coffee", "tea", "mate"]);
        assert_eq!(buffer.take(&"cocoa"), None);
    }

    #[test]
    fn restore_may_exceed_capacity() {
        let mut buffer = ProducerBuffer::new();
        assert!(buffer.try_publish("tea", 1));
        buffer.restore("tea");
        assert_eq!(buffer.len(), 2);
        // restored units are not new publications
        assert_eq!(buffer.published(), 1);
        assert!(!buffer.try_publish("tea", 1));
    }
}
