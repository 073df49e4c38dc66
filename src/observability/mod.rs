//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! pool, health and http produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout, pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured fields (pool, component, request id) rather than formatted strings
//! - Request ID flows through every inbound request span
//! - Metrics are cheap (atomic increments)

pub mod logging;
pub mod metrics;
