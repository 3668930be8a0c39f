//! Consumer worker: works through its shopping lists against a single cart
//! and turns it into one order at the end.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use agora_core::{CartId, MarketResult, ValueObject};
use agora_market::Market;

use crate::retry::{Attempt, RetryPolicy, Shutdown};
use crate::sink::PurchaseSink;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CartAction {
    Add,
    Remove,
}

/// One step of a shopping list.
#[derive(Debug, Clone, PartialEq)]
pub struct CartOp<P> {
    pub action: CartAction,
    pub product: P,
    pub quantity: u32,
}

impl<P> CartOp<P> {
    pub fn add(product: P, quantity: u32) -> Self {
        Self {
            action: CartAction::Add,
            product,
            quantity,
        }
    }

    pub fn remove(product: P, quantity: u32) -> Self {
        Self {
            action: CartAction::Remove,
            product,
            quantity,
        }
    }
}

/// A drained cart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Order<P> {
    pub cart_id: CartId,
    pub items: Vec<P>,
    pub placed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsumerReport<P> {
    pub name: String,
    /// `None` when shutdown interrupted the lists before the order was placed.
    pub order: Option<Order<P>>,
    /// Units given up on after the retry budget ran out.
    pub abandoned: u64,
    /// Set when shutdown interrupted the shopping list.
    pub cancelled: bool,
}

impl<P> ConsumerReport<P> {
    pub fn items_bought(&self) -> usize {
        self.order.as_ref().map_or(0, |o| o.items.len())
    }
}

pub struct ConsumerWorker<P, M> {
    name: String,
    carts: Vec<Vec<CartOp<P>>>,
    market: M,
    retry: RetryPolicy,
    shutdown: Shutdown,
    sink: Arc<dyn PurchaseSink<P>>,
}

impl<P, M> ConsumerWorker<P, M>
where
    P: ValueObject,
    M: Market<P>,
{
    /// The inner lists run in order against the same cart, so a `remove` may
    /// take back a unit added by an earlier list.
    pub fn new(
        name: impl Into<String>,
        carts: Vec<Vec<CartOp<P>>>,
        market: M,
        retry: RetryPolicy,
        shutdown: Shutdown,
        sink: Arc<dyn PurchaseSink<P>>,
    ) -> Self {
        Self {
            name: name.into(),
            carts,
            market,
            retry,
            shutdown,
            sink,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `add` waits for stock unit by unit; `remove` never waits. Shutdown
    /// leaves the cart as-is and skips the order.
    pub fn run(self) -> MarketResult<ConsumerReport<P>> {
        info!(consumer = %self.name, lists = self.carts.len(), "consumer started");
        let mut report = ConsumerReport {
            name: self.name.clone(),
            order: None,
            abandoned: 0,
            cancelled: false,
        };

        let cart_id = self.market.new_cart()?;

        'lists: for op in self.carts.iter().flatten() {
            match op.action {
                CartAction::Add => {
                    for _ in 0..op.quantity {
                        let attempt = self
                            .retry
                            .run(&self.shutdown, || self.market.add_to_cart(cart_id, &op.product))?;
                        match attempt {
                            Attempt::Succeeded { misses } => {
                                if misses > 0 {
                                    debug!(consumer = %self.name, %cart_id, misses, "product arrived");
                                }
                            }
                            Attempt::Exhausted => {
                                report.abandoned += 1;
                                warn!(consumer = %self.name, %cart_id, product = ?op.product, "gave up waiting for product");
                            }
                            Attempt::Cancelled => {
                                report.cancelled = true;
                                break 'lists;
                            }
                        }
                    }
                }
                CartAction::Remove => {
                    for _ in 0..op.quantity {
                        self.market.remove_from_cart(cart_id, &op.product)?;
                    }
                }
            }
        }

        if !report.cancelled {
            let items = self.market.place_order(cart_id)?;
            self.sink.record(&self.name, &items);
            report.order = Some(Order {
                cart_id,
                items,
                placed_at: Utc::now(),
            });
        }

        info!(
            consumer = %self.name,
            %cart_id,
            items = report.items_bought(),
            cancelled = report.cancelled,
            "consumer finished"
        );
        Ok(report)
    }
}
