//! Producer worker: registers once, then keeps publishing its production
//! list until shutdown.

use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, warn};

use agora_core::{MarketResult, ProducerId, ValueObject};
use agora_market::Market;

use crate::retry::{Attempt, RetryPolicy, Shutdown};

/// One entry of a production list: publish `quantity` units of `product`,
/// pausing `make_time` after each accepted unit.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductionLine<P> {
    pub product: P,
    pub quantity: u32,
    pub make_time: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProducerReport {
    pub name: String,
    pub producer_id: ProducerId,
    /// Units the registry accepted.
    pub published: u64,
}

#[derive(Debug)]
pub struct ProducerWorker<P, M> {
    name: String,
    lines: Vec<ProductionLine<P>>,
    market: M,
    retry: RetryPolicy,
    shutdown: Shutdown,
}

impl<P, M> ProducerWorker<P, M>
where
    P: ValueObject,
    M: Market<P>,
{
    /// `retry.delay` is the republish wait used when the buffer is full.
    pub fn new(
        name: impl Into<String>,
        lines: Vec<ProductionLine<P>>,
        market: M,
        retry: RetryPolicy,
        shutdown: Shutdown,
    ) -> Self {
        Self {
            name: name.into(),
            lines,
            market,
            retry,
            shutdown,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Cycle through the production list until shutdown fires.
    pub fn run(self) -> MarketResult<ProducerReport> {
        let producer_id = self.market.register_producer()?;
        info!(producer = %self.name, %producer_id, "producer started");

        let mut published = 0u64;
        let has_work = self.lines.iter().any(|line| line.quantity > 0);
        'production: while has_work {
            for line in &self.lines {
                for _ in 0..line.quantity {
                    let attempt = self.retry.run(&self.shutdown, || {
                        self.market.publish(producer_id, line.product.clone())
                    })?;
                    match attempt {
                        Attempt::Succeeded { misses } => {
                            published += 1;
                            if misses > 0 {
                                debug!(producer = %self.name, misses, "buffer had room again");
                            }
                            if self.shutdown.sleep(line.make_time) {
                                break 'production;
                            }
                        }
                        Attempt::Exhausted => {
                            warn!(producer = %self.name, product = ?line.product, "unit dropped, buffer stayed full");
                        }
                        Attempt::Cancelled => break 'production,
                    }
                }
            }
        }

        info!(producer = %self.name, %producer_id, published, "producer stopped");
        Ok(ProducerReport {
            name: self.name,
            producer_id,
            published,
        })
    }
}
