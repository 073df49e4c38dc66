//! Health aggregation subsystem.
//!
//! # Data Flow
//! ```text
//! GET /actuator/health
//!     → aggregator.rs (snapshot registry)
//!     → one task per probe (probe.rs), each under its own timeout
//!     → status.rs (UP / DOWN / UNKNOWN per component)
//!     → report.rs (overall status + components in registration order)
//! ```
//!
//! # Design Decisions
//! - Probes are plain async trait objects, no framework contributor types
//! - Individual backend problems are encoded as DOWN, never raised
//! - Results are computed on every request, nothing is cached

pub mod aggregator;
pub mod probe;
pub mod report;
pub mod status;

pub use aggregator::{CompositeHealthAggregator, HealthError};
pub use probe::{probe_fn, FnProbe, HealthProbe, ProbeError};
pub use report::{ComponentHealth, CompositeHealthReport};
pub use status::{HealthStatus, Status};
