//! Runs a scenario: one thread per worker around a shared registry.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use serde::Serialize;
use tracing::{error, info, info_span};
use uuid::Uuid;

use agora_core::MarketResult;
use agora_market::{MarketStats, Marketplace};
use agora_products::Product;

use crate::consumer::{ConsumerReport, ConsumerWorker};
use crate::error::{ScenarioError, SimError};
use crate::producer::{ProducerReport, ProducerWorker};
use crate::retry::{RetryPolicy, Shutdown};
use crate::scenario::{Scenario, scaled};
use crate::sink::PurchaseSink;

/// Env var holding the time-scale multiplier.
pub const TIME_SCALE_ENV: &str = "AGORA_TIME_SCALE";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunOptions {
    /// Multiplier applied to every wait in the scenario.
    pub time_scale: f64,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self { time_scale: 1.0 }
    }
}

impl RunOptions {
    pub fn with_time_scale(time_scale: f64) -> Result<Self, ScenarioError> {
        if !time_scale.is_finite() || time_scale < 0.0 {
            return Err(ScenarioError::invalid(format!(
                "time scale must be a non-negative number, got {time_scale}"
            )));
        }
        Ok(Self { time_scale })
    }

    /// Defaults when the variable is unset.
    pub fn from_env() -> Result<Self, ScenarioError> {
        match std::env::var(TIME_SCALE_ENV) {
            Ok(raw) => {
                let scale = raw.trim().parse::<f64>().map_err(|e| {
                    ScenarioError::invalid(format!("{TIME_SCALE_ENV}={raw}: {e}"))
                })?;
                Self::with_time_scale(scale)
            }
            Err(_) => Ok(Self::default()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SimReport {
    pub run_id: Uuid,
    pub producers: Vec<ProducerReport>,
    pub consumers: Vec<ConsumerReport<Product>>,
    /// Census taken after every worker stopped.
    pub stats: MarketStats,
}

impl SimReport {
    pub fn items_bought(&self) -> usize {
        self.consumers.iter().map(|c| c.items_bought()).sum()
    }
}

fn spawn_named<T, F>(name: &str, f: F) -> Result<JoinHandle<T>, SimError>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    thread::Builder::new()
        .name(name.to_string())
        .spawn(f)
        .map_err(|source| SimError::Spawn {
            name: name.to_string(),
            source,
        })
}

/// Join one worker, keeping the first failure seen. Any failure raises the
/// shutdown signal so the remaining workers wind down.
fn join_worker<R>(
    name: &str,
    handle: JoinHandle<MarketResult<R>>,
    shutdown: &Shutdown,
    failure: &mut Option<SimError>,
) -> Option<R> {
    let err = match handle.join() {
        Ok(Ok(report)) => return Some(report),
        Ok(Err(e)) => SimError::Market(e),
        Err(_) => SimError::WorkerPanicked(name.to_string()),
    };
    error!(worker = name, error = %err, "worker failed");
    shutdown.trigger();
    if failure.is_none() {
        *failure = Some(err);
    }
    None
}

/// Run every producer and consumer of `scenario` to completion.
///
/// Consumers run through their shopping lists; producers keep publishing
/// until the last consumer is done, then get shut down. Purchases go to
/// `sink` as each order is placed.
pub fn run_scenario(
    scenario: &Scenario,
    options: RunOptions,
    sink: Arc<dyn PurchaseSink<Product>>,
) -> Result<SimReport, SimError> {
    scenario.validate()?;
    let run_id = Uuid::now_v7();
    let span = info_span!("simulation", %run_id);
    let _enter = span.enter();

    let market = Arc::new(Marketplace::<Product>::new(scenario.queue_size_per_producer)?);
    let shutdown = Shutdown::new();

    // Build every worker before starting any thread so config errors leave
    // nothing running.
    let mut producers = Vec::with_capacity(scenario.producers.len());
    for spec in &scenario.producers {
        let retry = RetryPolicy::fixed(scaled(spec.republish_wait_time, options.time_scale)?);
        producers.push(ProducerWorker::new(
            spec.name.clone(),
            scenario.production_lines(spec, options.time_scale)?,
            Arc::clone(&market),
            retry,
            shutdown.clone(),
        ));
    }
    let mut consumers = Vec::with_capacity(scenario.consumers.len());
    for spec in &scenario.consumers {
        let mut retry = RetryPolicy::fixed(scaled(spec.retry_wait_time, options.time_scale)?);
        if let Some(max) = spec.max_attempts {
            retry = retry.with_max_attempts(max);
        }
        consumers.push(ConsumerWorker::new(
            spec.name.clone(),
            scenario.shopping_lists(spec)?,
            Arc::clone(&market),
            retry,
            shutdown.clone(),
            Arc::clone(&sink),
        ));
    }

    info!(
        capacity = scenario.queue_size_per_producer,
        producers = producers.len(),
        consumers = consumers.len(),
        units_requested = scenario.units_requested(),
        "simulation starting"
    );

    let mut producer_handles = Vec::with_capacity(producers.len());
    let mut consumer_handles = Vec::with_capacity(consumers.len());
    let mut failure = None;

    for worker in producers {
        let name = worker.name().to_string();
        match spawn_named(&name, move || worker.run()) {
            Ok(handle) => producer_handles.push((name, handle)),
            Err(e) => {
                failure = Some(e);
                break;
            }
        }
    }
    if failure.is_none() {
        for worker in consumers {
            let name = worker.name().to_string();
            match spawn_named(&name, move || worker.run()) {
                Ok(handle) => consumer_handles.push((name, handle)),
                Err(e) => {
                    failure = Some(e);
                    break;
                }
            }
        }
    }
    if failure.is_some() {
        shutdown.trigger();
    }

    let consumer_reports: Vec<_> = consumer_handles
        .into_iter()
        .filter_map(|(name, handle)| join_worker(&name, handle, &shutdown, &mut failure))
        .collect();

    shutdown.trigger();
    let producer_reports: Vec<_> = producer_handles
        .into_iter()
        .filter_map(|(name, handle)| join_worker(&name, handle, &shutdown, &mut failure))
        .collect();

    if let Some(err) = failure {
        return Err(err);
    }

    let stats = market.stats()?;
    let report = SimReport {
        run_id,
        producers: producer_reports,
        consumers: consumer_reports,
        stats,
    };
    info!(
        published = stats.published,
        sold = stats.sold,
        buffered = stats.buffered,
        reserved = stats.reserved,
        conserved = stats.is_conserved(),
        "simulation finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_scale_must_be_non_negative() {
        assert!(RunOptions::with_time_scale(0.0).is_ok());
        assert!(RunOptions::with_time_scale(-1.0).is_err());
        assert!(RunOptions::with_time_scale(f64::NAN).is_err());
        assert_eq!(RunOptions::default().time_scale, 1.0);
    }
}
