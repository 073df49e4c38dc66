//! HTTP integration with the core services.
//!
//! # Responsibilities
//! - Route data calls to the backends through the bounded worker pool
//! - Probe each backend's liveness endpoint
//! - Fetch product, recommendations and reviews for the composite view
//!
//! # Design Decisions
//! - Health probes bypass the pool: a saturated pool must not make the
//!   health endpoint report every backend DOWN
//! - A 2xx answer without a readable status counts as UP
//! - Pool rejection surfaces as `Overloaded` and is never retried inline

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::config::{BackendsConfig, TimeoutConfig};
use crate::health::{probe_fn, CompositeHealthAggregator, HealthError, HealthStatus, ProbeError};
use crate::integration::backend::{Backend, BackendRequest, Endpoints};
use crate::integration::IntegrationError;
use crate::pool::BoundedWorkerPool;

/// Combined view of one product.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductAggregate {
    pub product_id: i32,
    pub product: Value,
    pub recommendations: Value,
    pub reviews: Value,
}

/// Caller side of the three core services.
#[derive(Debug, Clone)]
pub struct ProductCompositeIntegration {
    client: reqwest::Client,
    pool: BoundedWorkerPool,
    endpoints: Endpoints,
}

impl ProductCompositeIntegration {
    pub fn new(
        backends: &BackendsConfig,
        timeouts: &TimeoutConfig,
        pool: BoundedWorkerPool,
    ) -> Result<Self, IntegrationError> {
        let endpoints = Endpoints::from_config(backends)?;
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .timeout(Duration::from_secs(timeouts.backend_secs))
            .user_agent(concat!("product-composite/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(IntegrationError::Client)?;

        Ok(Self {
            client,
            pool,
            endpoints,
        })
    }

    /// The pool data calls are routed through.
    pub fn pool(&self) -> &BoundedWorkerPool {
        &self.pool
    }

    pub async fn product_health(&self) -> Result<HealthStatus, ProbeError> {
        self.health(Backend::Product).await
    }

    pub async fn recommendation_health(&self) -> Result<HealthStatus, ProbeError> {
        self.health(Backend::Recommendation).await
    }

    pub async fn review_health(&self) -> Result<HealthStatus, ProbeError> {
        self.health(Backend::Review).await
    }

    /// Query a backend's liveness endpoint.
    async fn health(&self, backend: Backend) -> Result<HealthStatus, ProbeError> {
        let endpoint = self.endpoints.get(backend);
        let url = endpoint
            .resolve(backend, endpoint.health_path())
            .map_err(|e| ProbeError::Unreachable(e.to_string()))?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ProbeError::Unreachable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProbeError::BadStatus(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ProbeError::Unreachable(e.to_string()))?;
        parse_health_body(&body)
    }

    /// Run a backend call on the worker pool and wait for its JSON result.
    pub async fn dispatch(&self, request: BackendRequest) -> Result<Value, IntegrationError> {
        let backend = request.backend;
        let url = self.endpoints.get(backend).resolve(backend, &request.path)?;
        let client = self.client.clone();

        let handle = self
            .pool
            .submit(fetch_json(client, backend, url))
            .map_err(|e| {
                tracing::warn!(backend = %backend, error = %e, "Backend call not attempted");
                IntegrationError::from(e)
            })?;

        handle
            .await
            .map_err(|source| IntegrationError::Aborted { backend, source })?
    }

    pub async fn get_product(&self, product_id: i32) -> Result<Value, IntegrationError> {
        self.dispatch(BackendRequest::product(product_id)).await
    }

    pub async fn get_recommendations(&self, product_id: i32) -> Result<Value, IntegrationError> {
        self.dispatch(BackendRequest::recommendations(product_id)).await
    }

    pub async fn get_reviews(&self, product_id: i32) -> Result<Value, IntegrationError> {
        self.dispatch(BackendRequest::reviews(product_id)).await
    }

    /// Fetch all three parts of a product concurrently.
    pub async fn product_aggregate(&self, product_id: i32) -> Result<ProductAggregate, IntegrationError> {
        let (product, recommendations, reviews) = tokio::try_join!(
            self.get_product(product_id),
            self.get_recommendations(product_id),
            self.get_reviews(product_id),
        )?;

        Ok(ProductAggregate {
            product_id,
            product,
            recommendations,
            reviews,
        })
    }
}

/// Register the core service probes in reporting order.
pub fn register_core_services(
    aggregator: &CompositeHealthAggregator,
    integration: Arc<ProductCompositeIntegration>,
) -> Result<(), HealthError> {
    let product = Arc::clone(&integration);
    aggregator.register(
        Backend::Product.name(),
        probe_fn(move || {
            let integration = Arc::clone(&product);
            async move { integration.product_health().await }
        }),
    )?;

    let recommendation = Arc::clone(&integration);
    aggregator.register(
        Backend::Recommendation.name(),
        probe_fn(move || {
            let integration = Arc::clone(&recommendation);
            async move { integration.recommendation_health().await }
        }),
    )?;

    let review = integration;
    aggregator.register(
        Backend::Review.name(),
        probe_fn(move || {
            let integration = Arc::clone(&review);
            async move { integration.review_health().await }
        }),
    )?;
    Ok(())
}

async fn fetch_json(client: reqwest::Client, backend: Backend, url: Url) -> Result<Value, IntegrationError> {
    tracing::debug!(backend = %backend, url = %url, "Calling backend");

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| IntegrationError::Transport {
            backend,
            message: e.to_string(),
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(IntegrationError::Backend {
            backend,
            status: status.as_u16(),
        });
    }

    response
        .json::<Value>()
        .await
        .map_err(|e| IntegrationError::Transport {
            backend,
            message: e.to_string(),
        })
}

fn parse_health_body(body: &[u8]) -> Result<HealthStatus, ProbeError> {
    let Ok(json) = serde_json::from_slice::<Value>(body) else {
        return Ok(HealthStatus::up());
    };

    match json.get("status") {
        None => Ok(HealthStatus::up()),
        Some(Value::String(status)) => Ok(match status.as_str() {
            "UP" => HealthStatus::up(),
            "DOWN" | "OUT_OF_SERVICE" => HealthStatus::down(format!("reported {status}")),
            "UNKNOWN" => HealthStatus::unknown(),
            other => HealthStatus::unknown().with_detail(format!("reported {other}")),
        }),
        Some(other) => Err(ProbeError::InvalidPayload(format!(
            "status field is not a string: {other}"
        ))),
    }
}
