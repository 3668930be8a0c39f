//! Marketplace simulation: producer and consumer worker threads driven by a
//! JSON scenario.
//!
//! Workers own all waiting and retrying; the registry they call never blocks.

pub mod consumer;
pub mod error;
pub mod producer;
pub mod retry;
pub mod runner;
pub mod scenario;
pub mod sink;

pub use consumer::{CartAction, CartOp, ConsumerReport, ConsumerWorker, Order};
pub use error::{ScenarioError, SimError};
pub use producer::{ProducerReport, ProducerWorker, ProductionLine};
pub use retry::{Attempt, RetryPolicy, Shutdown};
pub use runner::{RunOptions, SimReport, run_scenario};
pub use scenario::{ConsumerSpec, ProducerSpec, Scenario};
pub use sink::{MemorySink, PurchaseSink, StdoutSink};
