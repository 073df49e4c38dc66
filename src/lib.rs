//! Product composite service library.
//!
//! Fronts the product, recommendation and review services: backend calls run
//! on a bounded worker pool, and the health of all three is aggregated into
//! one report.

pub mod config;
pub mod health;
pub mod http;
pub mod integration;
pub mod lifecycle;
pub mod observability;
pub mod pool;

pub use config::CompositeConfig;
pub use health::{CompositeHealthAggregator, CompositeHealthReport};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use pool::BoundedWorkerPool;
