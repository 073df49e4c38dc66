//! Integration with the product, recommendation and review services.
//!
//! # Data Flow
//! ```text
//! data call (GET /product-composite/{id})
//!     → client.rs dispatch → pool.submit → backend HTTP call on a slot
//!     → JSON result through the task handle
//!
//! health probe (aggregator)
//!     → client.rs health(backend) → GET <base>/actuator/health (no pool)
//! ```

pub mod backend;
pub mod client;

use thiserror::Error;

use crate::pool::{PoolError, TaskError};

pub use backend::{Backend, BackendRequest, Endpoints};
pub use client::{register_core_services, ProductAggregate, ProductCompositeIntegration};

/// Errors from calling a backend.
#[derive(Debug, Error)]
pub enum IntegrationError {
    /// The pool rejected the call. It was never attempted.
    #[error("service temporarily overloaded")]
    Overloaded(#[source] PoolError),

    #[error("backend call pool is shut down")]
    PoolClosed(#[source] PoolError),

    #[error("{backend} call aborted: {source}")]
    Aborted {
        backend: Backend,
        #[source]
        source: TaskError,
    },

    #[error("{backend} returned status {status}")]
    Backend { backend: Backend, status: u16 },

    #[error("{backend} transport error: {message}")]
    Transport { backend: Backend, message: String },

    #[error("invalid {backend} url: {message}")]
    InvalidUrl { backend: Backend, message: String },

    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),
}

impl From<PoolError> for IntegrationError {
    fn from(err: PoolError) -> Self {
        match err {
            PoolError::Rejected { .. } => IntegrationError::Overloaded(err),
            _ => IntegrationError::PoolClosed(err),
        }
    }
}
