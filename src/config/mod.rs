//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML) or built-in defaults
//!     → loader.rs (parse & deserialize)
//!     → loader.rs (APP_THREAD_POOL_SIZE / APP_TASK_QUEUE_SIZE overrides)
//!     → validation.rs (semantic checks)
//!     → CompositeConfig (validated, immutable)
//!     → handed to the startup routine
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the pool is sized exactly once
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{default_config, load_config, ConfigError};
pub use schema::{
    BackendConfig, BackendsConfig, CompositeConfig, HealthConfig, ListenerConfig, LogFormat,
    ObservabilityConfig, PoolConfig, TimeoutConfig,
};
