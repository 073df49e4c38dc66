//! Composite health aggregation.
//!
//! # Responsibilities
//! - Keep a named, ordered registry of probes
//! - Invoke every probe concurrently, each under its own timeout
//! - Fold the results into one report, in registration order
//!
//! # Design Decisions
//! - Each probe runs as its own task: a slow, blocking or panicking probe
//!   cannot hold up or fail the others
//! - Probe failures, timeouts and panics become DOWN entries; aggregation
//!   itself never fails
//! - The registry is snapshotted before fan-out, so registration never
//!   waits on a running health check

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::future::join_all;
use parking_lot::RwLock;
use thiserror::Error;
use tokio::task::JoinError;

use crate::health::probe::HealthProbe;
use crate::health::report::{ComponentHealth, CompositeHealthReport};
use crate::health::status::HealthStatus;
use crate::observability::metrics;
use crate::pool::handle::panic_message;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HealthError {
    /// A probe with this name is already registered. Startup misconfiguration.
    #[error("health probe '{0}' is already registered")]
    DuplicateName(String),
}

struct NamedHealthEntry {
    name: String,
    probe: Arc<dyn HealthProbe>,
    timeout: Duration,
}

/// Registry of named probes producing a [`CompositeHealthReport`].
pub struct CompositeHealthAggregator {
    entries: RwLock<Vec<Arc<NamedHealthEntry>>>,
    default_timeout: Duration,
}

impl std::fmt::Debug for CompositeHealthAggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeHealthAggregator")
            .field("components", &self.names())
            .field("default_timeout", &self.default_timeout)
            .finish()
    }
}

impl CompositeHealthAggregator {
    /// Create an empty registry whose probes default to `default_timeout`.
    pub fn new(default_timeout: Duration) -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
            default_timeout,
        }
    }

    /// Register a probe under `name` using the default timeout.
    pub fn register<P>(&self, name: impl Into<String>, probe: P) -> Result<(), HealthError>
    where
        P: HealthProbe + 'static,
    {
        self.register_with_timeout(name, probe, self.default_timeout)
    }

    /// Register a probe with its own timeout.
    ///
    /// Fails with [`HealthError::DuplicateName`] and leaves the existing entry
    /// untouched if `name` is taken.
    pub fn register_with_timeout<P>(
        &self,
        name: impl Into<String>,
        probe: P,
        timeout: Duration,
    ) -> Result<(), HealthError>
    where
        P: HealthProbe + 'static,
    {
        let name = name.into();
        let mut entries = self.entries.write();
        if entries.iter().any(|e| e.name == name) {
            return Err(HealthError::DuplicateName(name));
        }

        tracing::debug!(component = %name, timeout_ms = timeout.as_millis() as u64, "Health probe registered");
        entries.push(Arc::new(NamedHealthEntry {
            name,
            probe: Arc::new(probe),
            timeout,
        }));
        Ok(())
    }

    /// Registered names in registration order.
    pub fn names(&self) -> Vec<String> {
        self.entries.read().iter().map(|e| e.name.clone()).collect()
    }

    /// Run every probe concurrently and combine the results.
    pub async fn composite_health(&self) -> CompositeHealthReport {
        let snapshot: Vec<Arc<NamedHealthEntry>> = self.entries.read().clone();

        let tasks: Vec<_> = snapshot
            .iter()
            .map(|entry| tokio::spawn(evaluate(Arc::clone(entry))))
            .collect();

        // join_all yields results in input order, independent of completion order.
        let components = join_all(tasks)
            .await
            .into_iter()
            .zip(&snapshot)
            .map(|(joined, entry)| joined.unwrap_or_else(|e| aborted(entry, e)))
            .collect();

        let report = CompositeHealthReport::new(components);
        tracing::debug!(status = %report.status, components = report.components.len(), "Composite health evaluated");
        report
    }

    /// Run a single named probe.
    pub async fn component_health(&self, name: &str) -> Option<ComponentHealth> {
        let entry = self
            .entries
            .read()
            .iter()
            .find(|e| e.name == name)
            .cloned()?;

        let fallback = Arc::clone(&entry);
        Some(
            tokio::spawn(evaluate(entry))
                .await
                .unwrap_or_else(|e| aborted(&fallback, e)),
        )
    }
}

async fn evaluate(entry: Arc<NamedHealthEntry>) -> ComponentHealth {
    let started = Instant::now();

    let health = match tokio::time::timeout(entry.timeout, entry.probe.check()).await {
        Ok(Ok(status)) => status,
        Ok(Err(e)) => {
            tracing::warn!(component = %entry.name, error = %e, "Health probe failed");
            HealthStatus::down(e.to_string())
        }
        Err(_) => {
            tracing::warn!(
                component = %entry.name,
                timeout_ms = entry.timeout.as_millis() as u64,
                "Health probe timed out"
            );
            HealthStatus::down(format!("timed out after {}ms", entry.timeout.as_millis()))
        }
    };

    metrics::record_probe(&entry.name, health.is_up(), started);
    ComponentHealth {
        name: entry.name.clone(),
        health,
    }
}

fn aborted(entry: &NamedHealthEntry, err: JoinError) -> ComponentHealth {
    let detail = if err.is_panic() {
        format!("probe panicked: {}", panic_message(err.into_panic().as_ref()))
    } else {
        "probe cancelled".to_string()
    };
    tracing::error!(component = %entry.name, detail = %detail, "Health probe aborted");

    ComponentHealth {
        name: entry.name.clone(),
        health: HealthStatus::down(detail),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::probe::{probe_fn, ProbeError};
    use crate::health::status::Status;

    fn up() -> impl HealthProbe {
        probe_fn(|| async { Ok(HealthStatus::up()) })
    }

    fn down(detail: &'static str) -> impl HealthProbe {
        probe_fn(move || async move { Err(ProbeError::Unreachable(detail.to_string())) })
    }

    fn sleepy(delay: Duration) -> impl HealthProbe {
        probe_fn(move || async move {
            tokio::time::sleep(delay).await;
            Ok(HealthStatus::up())
        })
    }

    fn aggregator() -> CompositeHealthAggregator {
        CompositeHealthAggregator::new(Duration::from_secs(2))
    }

    #[tokio::test]
    async fn test_all_up() {
        let agg = aggregator();
        agg.register("product", up()).unwrap();
        agg.register("recommendation", up()).unwrap();
        agg.register("review", up()).unwrap();

        let report = agg.composite_health().await;
        assert_eq!(report.status, Status::Up);
        assert_eq!(report.names(), vec!["product", "recommendation", "review"]);
    }

    #[tokio::test]
    async fn test_one_down_keeps_all_components() {
        let agg = aggregator();
        agg.register("product", up()).unwrap();
        agg.register("recommendation", down("connection refused")).unwrap();
        agg.register("review", up()).unwrap();

        let report = agg.composite_health().await;
        assert_eq!(report.status, Status::Down);
        assert_eq!(report.names(), vec!["product", "recommendation", "review"]);
        assert_eq!(
            report.component("recommendation"),
            Some(&HealthStatus::down("unreachable: connection refused"))
        );
        assert_eq!(report.component("review"), Some(&HealthStatus::up()));
    }

    #[tokio::test]
    async fn test_timeout_only_affects_slow_probe() {
        let agg = aggregator();
        agg.register_with_timeout("product", sleepy(Duration::from_secs(60)), Duration::from_millis(50))
            .unwrap();
        agg.register("recommendation", sleepy(Duration::from_millis(10))).unwrap();
        agg.register("review", up()).unwrap();

        let started = Instant::now();
        let report = agg.composite_health().await;
        assert!(started.elapsed() < Duration::from_secs(1));

        assert_eq!(report.status, Status::Down);
        assert_eq!(report.names(), vec!["product", "recommendation", "review"]);
        assert_eq!(
            report.component("product"),
            Some(&HealthStatus::down("timed out after 50ms"))
        );
        assert!(report.component("recommendation").unwrap().is_up());
        assert!(report.component("review").unwrap().is_up());
    }

    #[tokio::test]
    async fn test_probes_run_concurrently() {
        let agg = aggregator();
        for name in ["product", "recommendation", "review"] {
            agg.register(name, sleepy(Duration::from_millis(300))).unwrap();
        }

        let started = Instant::now();
        let report = agg.composite_health().await;
        assert_eq!(report.status, Status::Up);
        assert!(
            started.elapsed() < Duration::from_millis(800),
            "probes appear to run sequentially: {:?}",
            started.elapsed()
        );
    }

    #[tokio::test]
    async fn test_duplicate_name_keeps_original() {
        let agg = aggregator();
        agg.register("product", up()).unwrap();

        let err = agg.register("product", down("should not replace")).unwrap_err();
        assert_eq!(err, HealthError::DuplicateName("product".to_string()));
        assert_eq!(agg.names(), vec!["product"]);

        let report = agg.composite_health().await;
        assert_eq!(report.component("product"), Some(&HealthStatus::up()));
    }

    #[tokio::test]
    async fn test_unknown_without_down() {
        let agg = aggregator();
        agg.register("product", up()).unwrap();
        agg.register("review", probe_fn(|| async { Ok(HealthStatus::unknown()) }))
            .unwrap();

        assert_eq!(agg.composite_health().await.status, Status::Unknown);
    }

    #[tokio::test]
    async fn test_empty_registry_is_unknown() {
        let agg = aggregator();
        assert!(agg.names().is_empty());
        let report = agg.composite_health().await;
        assert_eq!(report.status, Status::Unknown);
        assert!(report.components.is_empty());
    }

    #[tokio::test]
    async fn test_panicking_probe_is_down() {
        let agg = aggregator();
        agg.register(
            "review",
            probe_fn(|| async {
                if true {
                    panic!("probe bug");
                }
                Ok(HealthStatus::up())
            }),
        )
        .unwrap();
        agg.register("product", up()).unwrap();

        let report = agg.composite_health().await;
        assert_eq!(
            report.component("review"),
            Some(&HealthStatus::down("probe panicked: probe bug"))
        );
        assert!(report.component("product").unwrap().is_up());
    }

    #[tokio::test]
    async fn test_component_health_by_name() {
        let agg = aggregator();
        agg.register("product", up()).unwrap();

        let component = agg.component_health("product").await.unwrap();
        assert_eq!(component.name, "product");
        assert!(component.health.is_up());
        assert!(agg.component_health("inventory").await.is_none());
    }

    #[tokio::test]
    async fn test_register_while_evaluating() {
        let agg = Arc::new(aggregator());
        agg.register("product", sleepy(Duration::from_millis(100))).unwrap();

        let running = {
            let agg = Arc::clone(&agg);
            tokio::spawn(async move { agg.composite_health().await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        agg.register("review", up()).unwrap();

        let report = running.await.unwrap();
        assert_eq!(report.names(), vec!["product"]);
        assert_eq!(agg.names(), vec!["product", "review"]);
    }
}
