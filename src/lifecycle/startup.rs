//! Startup orchestration.
//!
//! # Responsibilities
//! - Reject configuration that fails semantic validation
//! - Build the worker pool from validated configuration
//! - Build the backend integration on top of the pool
//! - Register the core service probes with the aggregator
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal, including a duplicate probe name
//! - Everything is constructed explicitly and passed by reference
//! - Metrics and logging are installed by the binary, not here, so tests
//!   can build many apps in one process

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::config::validation::validate_config;
use crate::config::{CompositeConfig, ConfigError};
use crate::health::{CompositeHealthAggregator, HealthError};
use crate::integration::{register_core_services, IntegrationError, ProductCompositeIntegration};
use crate::pool::{BoundedWorkerPool, PoolError, ShutdownMode};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("worker pool: {0}")]
    Pool(#[from] PoolError),

    #[error("integration: {0}")]
    Integration(#[from] IntegrationError),

    #[error("health registry: {0}")]
    Health(#[from] HealthError),
}

/// Everything the service needs at runtime.
#[derive(Debug, Clone)]
pub struct App {
    pub config: CompositeConfig,
    pub pool: BoundedWorkerPool,
    pub integration: Arc<ProductCompositeIntegration>,
    pub health: Arc<CompositeHealthAggregator>,
}

/// Construct the pool, integration and health registry.
pub fn build(config: CompositeConfig) -> Result<App, StartupError> {
    validate_config(&config).map_err(ConfigError::Validation)?;

    tracing::info!(
        max_concurrency = config.pool.max_concurrency,
        max_queue_depth = config.pool.max_queue_depth,
        "Creating backend call pool"
    );
    let pool = BoundedWorkerPool::new(config.pool.clone())?;

    let integration = Arc::new(ProductCompositeIntegration::new(
        &config.backends,
        &config.timeouts,
        pool.clone(),
    )?);

    let health = Arc::new(CompositeHealthAggregator::new(Duration::from_millis(
        config.health.probe_timeout_ms,
    )));
    register_core_services(&health, Arc::clone(&integration))?;

    Ok(App {
        config,
        pool,
        integration,
        health,
    })
}

impl App {
    /// Stop the pool, wait up to `timeouts.drain_secs`, then discard leftovers.
    pub async fn drain(&self) {
        self.pool.shutdown(ShutdownMode::Graceful);

        let deadline = Duration::from_secs(self.config.timeouts.drain_secs);
        if tokio::time::timeout(deadline, self.pool.wait_idle()).await.is_err() {
            let discarded = self.pool.shutdown(ShutdownMode::Immediate);
            tracing::warn!(
                pool = %self.pool.name(),
                discarded,
                "Drain deadline passed, queued backend calls discarded"
            );
        }
    }
}
