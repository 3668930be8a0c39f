//! Simulation error model.

use thiserror::Error;

use agora_core::MarketError;

/// Problems with a scenario file, detected before any thread starts.
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("failed to read scenario: {0}")]
    Read(#[from] std::io::Error),

    #[error("failed to parse scenario: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid scenario: {0}")]
    Invalid(String),

    #[error("unknown product id '{product}' referenced by {worker}")]
    UnknownProduct { worker: String, product: String },
}

impl ScenarioError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid(msg.into())
    }
}

/// Failures while running a scenario.
#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Scenario(#[from] ScenarioError),

    #[error("marketplace error: {0}")]
    Market(#[from] MarketError),

    #[error("failed to spawn worker '{name}': {source}")]
    Spawn {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("worker '{0}' panicked")]
    WorkerPanicked(String),
}
