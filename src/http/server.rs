//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, tracing, timeout)
//! - Serve the composite health, pool stats and product endpoints
//! - Stop accepting on the shutdown signal
//!
//! # Routes
//! - `GET /actuator/health` composite report, always 200
//! - `GET /actuator/health/{component}` one component, 404 if unknown
//! - `GET /actuator/pool` worker pool snapshot
//! - `GET /product-composite/{product_id}` product, recommendations and reviews

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::health::CompositeHealthAggregator;
use crate::http::request::{propagate_request_id_layer, request_span, set_request_id_layer};
use crate::http::response::ApiError;
use crate::integration::{ProductAggregate, ProductCompositeIntegration};
use crate::lifecycle::{App, ShutdownSignal};
use crate::observability::metrics;
use crate::pool::{BoundedWorkerPool, PoolStats};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub integration: Arc<ProductCompositeIntegration>,
    pub health: Arc<CompositeHealthAggregator>,
    pub pool: BoundedWorkerPool,
}

/// HTTP server for the composite service.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(app: &App) -> Self {
        let state = AppState {
            integration: Arc::clone(&app.integration),
            health: Arc::clone(&app.health),
            pool: app.pool.clone(),
        };
        let request_timeout = Duration::from_secs(app.config.timeouts.request_secs);

        Self {
            router: Self::build_router(state, request_timeout),
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(state: AppState, request_timeout: Duration) -> Router {
        Router::new()
            .route("/actuator/health", get(health_handler))
            .route("/actuator/health/{component}", get(component_health_handler))
            .route("/actuator/pool", get(pool_handler))
            .route("/product-composite/{product_id}", get(product_composite_handler))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(set_request_id_layer())
                    .layer(TraceLayer::new_for_http().make_span_with(request_span))
                    .layer(propagate_request_id_layer())
                    .layer(TimeoutLayer::new(request_timeout)),
            )
    }

    /// The router, for serving in-process without a listener.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve on `listener` until `shutdown` fires.
    pub async fn run(self, listener: TcpListener, shutdown: ShutdownSignal) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown.recv())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let started = Instant::now();
    let report = state.health.composite_health().await;
    metrics::record_request("/actuator/health", 200, started);
    Json(report)
}

async fn component_health_handler(
    State(state): State<AppState>,
    Path(component): Path<String>,
) -> Result<Response, ApiError> {
    match state.health.component_health(&component).await {
        Some(health) => Ok(Json(health).into_response()),
        None => Err(ApiError::NotFound(format!("no health component named '{component}'"))),
    }
}

async fn pool_handler(State(state): State<AppState>) -> Json<PoolStats> {
    Json(state.pool.stats())
}

async fn product_composite_handler(
    State(state): State<AppState>,
    Path(product_id): Path<i32>,
) -> Result<Json<ProductAggregate>, ApiError> {
    let started = Instant::now();
    tracing::debug!(product_id, "Fetching composite product");

    let result = if product_id < 1 {
        Err(ApiError::InvalidInput(format!("Invalid productId: {product_id}")))
    } else {
        state
            .integration
            .product_aggregate(product_id)
            .await
            .map_err(ApiError::from)
    };

    let status = match &result {
        Ok(_) => 200,
        Err(err) => err.status().as_u16(),
    };
    metrics::record_request("/product-composite", status, started);

    result.map(Json)
}
