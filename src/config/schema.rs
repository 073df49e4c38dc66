//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the composite
//! service. All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the product composite service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct CompositeConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Worker pool used for outbound backend calls.
    pub pool: PoolConfig,

    /// Downstream service endpoints.
    pub backends: BackendsConfig,

    /// Composite health settings.
    pub health: HealthConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:7000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:7000".to_string(),
        }
    }
}

/// Bounded worker pool configuration.
///
/// `thread_pool_size` and `task_queue_size` are accepted as aliases so that
/// existing deployment files keep working.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Maximum number of backend calls executing at once.
    #[serde(alias = "thread_pool_size")]
    pub max_concurrency: usize,

    /// Maximum number of calls allowed to wait for a slot.
    #[serde(alias = "task_queue_size")]
    pub max_queue_depth: usize,

    /// Label used in logs and metrics.
    pub name: String,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 10,
            max_queue_depth: 100,
            name: "publish-pool".to_string(),
        }
    }
}

/// Endpoints of the three core services.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BackendsConfig {
    pub product: BackendConfig,
    pub recommendation: BackendConfig,
    pub review: BackendConfig,
}

impl Default for BackendsConfig {
    fn default() -> Self {
        Self {
            product: BackendConfig::new("http://product:8080"),
            recommendation: BackendConfig::new("http://recommendation:8080"),
            review: BackendConfig::new("http://review:8080"),
        }
    }
}

/// A single backend service.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackendConfig {
    /// Base URL, e.g. "http://127.0.0.1:7001".
    pub base_url: String,

    /// Path probed for liveness.
    #[serde(default = "default_health_path")]
    pub health_path: String,
}

impl BackendConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            health_path: default_health_path(),
        }
    }
}

fn default_health_path() -> String {
    "/actuator/health".to_string()
}

/// Composite health configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HealthConfig {
    /// Upper bound on a single probe, in milliseconds.
    pub probe_timeout_ms: u64,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            probe_timeout_ms: 2000,
        }
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout for backend calls in seconds.
    pub connect_secs: u64,

    /// Total time for one backend call in seconds.
    pub backend_secs: u64,

    /// Inbound request timeout in seconds.
    pub request_secs: u64,

    /// How long shutdown waits for the pool to drain before discarding queued work.
    pub drain_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 2,
            backend_secs: 5,
            request_secs: 30,
            drain_secs: 10,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
