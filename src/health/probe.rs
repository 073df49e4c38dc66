//! Probe contract.
//!
//! A probe answers "is this one dependency alive right now". Probes are
//! invoked fresh on every composite health request.

use std::future::Future;

use async_trait::async_trait;
use thiserror::Error;

use crate::health::status::HealthStatus;

/// Why a probe could not produce a status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
    #[error("unreachable: {0}")]
    Unreachable(String),

    #[error("unexpected status {0}")]
    BadStatus(u16),

    #[error("invalid health payload: {0}")]
    InvalidPayload(String),
}

#[async_trait]
pub trait HealthProbe: Send + Sync {
    async fn check(&self) -> Result<HealthStatus, ProbeError>;
}

/// A probe backed by a closure returning a future.
pub struct FnProbe<F> {
    f: F,
}

/// Wrap a closure as a [`HealthProbe`].
pub fn probe_fn<F, Fut>(f: F) -> FnProbe<F>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<HealthStatus, ProbeError>> + Send + 'static,
{
    FnProbe { f }
}

#[async_trait]
impl<F, Fut> HealthProbe for FnProbe<F>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<HealthStatus, ProbeError>> + Send + 'static,
{
    async fn check(&self) -> Result<HealthStatus, ProbeError> {
        (self.f)().await
    }
}
