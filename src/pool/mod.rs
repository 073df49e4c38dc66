//! Bounded execution of outbound backend calls.
//!
//! # Data Flow
//! ```text
//! submit(work)
//!     → slot free?      → start now (worker.rs spawns on the runtime)
//!     → queue has room? → push back, wait for a slot
//!     → otherwise       → PoolError::Rejected (work never runs)
//!
//! work completes (value, error or panic)
//!     → SlotGuard dropped
//!     → oldest queued job takes the slot, or the slot is freed
//!     → result delivered through handle.rs
//! ```
//!
//! # Design Decisions
//! - Backpressure is explicit: `submit` never waits for capacity
//! - Two knobs bound both parallelism and memory held by pending work
//! - Graceful shutdown drains, immediate shutdown cancels what has not started

pub mod handle;
pub mod worker;

use thiserror::Error;

pub use handle::{TaskError, TaskHandle};
pub use worker::{BoundedWorkerPool, PoolStats, ShutdownMode};

/// Errors returned by [`BoundedWorkerPool`] admission.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
    /// All slots busy and the queue is full. The work was not attempted.
    #[error("pool '{pool}' is at capacity, request rejected")]
    Rejected { pool: String },

    /// The pool has been shut down.
    #[error("pool '{pool}' is shut down")]
    Closed { pool: String },

    #[error("invalid pool configuration: {0}")]
    InvalidConfig(String),

    #[error("worker pool must be created inside a Tokio runtime")]
    NoRuntime,
}
