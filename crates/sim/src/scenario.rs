//! Scenario files: the marketplace capacity, the product catalogue and the
//! workers to start.
//!
//! Times are given in seconds as floats.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use agora_products::{Catalogue, Product};

use crate::consumer::{CartAction, CartOp};
use crate::error::ScenarioError;
use crate::producer::ProductionLine;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub queue_size_per_producer: usize,
    pub products: Catalogue,
    #[serde(default)]
    pub producers: Vec<ProducerSpec>,
    #[serde(default)]
    pub consumers: Vec<ConsumerSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProducerSpec {
    pub name: String,
    /// `(product id, quantity, seconds to make one unit)`.
    pub products: Vec<(String, u32, f64)>,
    pub republish_wait_time: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsumerSpec {
    pub name: String,
    pub carts: Vec<Vec<CartOpSpec>>,
    pub retry_wait_time: f64,
    /// Attempts per unit before giving up; absent means wait forever.
    #[serde(default)]
    pub max_attempts: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartOpSpec {
    #[serde(rename = "type")]
    pub action: CartAction,
    pub product: String,
    pub quantity: u32,
}

/// Seconds from the file, multiplied by the run's time scale.
pub(crate) fn scaled(seconds: f64, time_scale: f64) -> Result<Duration, ScenarioError> {
    Duration::try_from_secs_f64(seconds * time_scale)
        .map_err(|e| ScenarioError::invalid(format!("bad duration {seconds}s x {time_scale}: {e}")))
}

impl Scenario {
    pub fn from_json(json: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = serde_json::from_str(json)?;
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ScenarioError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Reject scenarios that could not run: zero capacity, blank names,
    /// negative or non-finite waits, dangling product ids.
    pub fn validate(&self) -> Result<(), ScenarioError> {
        if self.queue_size_per_producer == 0 {
            return Err(ScenarioError::invalid("queue_size_per_producer must be > 0"));
        }

        for producer in &self.producers {
            check_name("producer", &producer.name)?;
            check_wait(&producer.name, "republish_wait_time", producer.republish_wait_time)?;
            for (product, _, make_time) in &producer.products {
                self.product(&producer.name, product)?;
                check_wait(&producer.name, "make time", *make_time)?;
            }
        }

        for consumer in &self.consumers {
            check_name("consumer", &consumer.name)?;
            check_wait(&consumer.name, "retry_wait_time", consumer.retry_wait_time)?;
            if consumer.max_attempts == Some(0) {
                return Err(ScenarioError::invalid(format!(
                    "{}: max_attempts must be > 0",
                    consumer.name
                )));
            }
            for op in consumer.carts.iter().flatten() {
                self.product(&consumer.name, &op.product)?;
            }
        }

        Ok(())
    }

    fn product(&self, worker: &str, id: &str) -> Result<&Product, ScenarioError> {
        self.products
            .get(id)
            .ok_or_else(|| ScenarioError::UnknownProduct {
                worker: worker.to_string(),
                product: id.to_string(),
            })
    }

    pub fn production_lines(
        &self,
        spec: &ProducerSpec,
        time_scale: f64,
    ) -> Result<Vec<ProductionLine<Product>>, ScenarioError> {
        spec.products
            .iter()
            .map(|(id, quantity, make_time)| {
                Ok::<_, ScenarioError>(ProductionLine {
                    product: self.product(&spec.name, id)?.clone(),
                    quantity: *quantity,
                    make_time: scaled(*make_time, time_scale)?,
                })
            })
            .collect()
    }

    pub fn shopping_lists(&self, spec: &ConsumerSpec) -> Result<Vec<Vec<CartOp<Product>>>, ScenarioError> {
        spec.carts
            .iter()
            .map(|cart| {
                cart.iter()
                    .map(|op| {
                        Ok::<_, ScenarioError>(CartOp {
                            action: op.action,
                            product: self.product(&spec.name, &op.product)?.clone(),
                            quantity: op.quantity,
                        })
                    })
                    .collect::<Result<Vec<_>, ScenarioError>>()
            })
            .collect()
    }

    /// Units consumers ask to add, across all shopping lists.
    pub fn units_requested(&self) -> u64 {
        self.consumers
            .iter()
            .flat_map(|c| c.carts.iter().flatten())
            .filter(|op| op.action == CartAction::Add)
            .map(|op| u64::from(op.quantity))
            .sum()
    }
}

fn check_name(kind: &str, name: &str) -> Result<(), ScenarioError> {
    if name.trim().is_empty() {
        return Err(ScenarioError::invalid(format!("{kind} name cannot be empty")));
    }
    Ok(())
}

fn check_wait(worker: &str, field: &str, seconds: f64) -> Result<(), ScenarioError> {
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(ScenarioError::invalid(format!(
            "{worker}: {field} must be a non-negative number of seconds, got {seconds}"
        )));
    }
    Ok(())
}
