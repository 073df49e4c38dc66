//! Bounded worker pool with a FIFO waiting queue.
//!
//! # Responsibilities
//! - Run submitted work on at most `max_concurrency` slots
//! - Hold at most `max_queue_depth` items waiting for a slot
//! - Reject synchronously once both are full (backpressure)
//! - Hand a freed slot straight to the oldest waiting item
//!
//! # Design Decisions
//! - One mutex guards the running count, the queue and the closed flag
//! - The lock is never held across an await or while user code runs
//! - Slot release lives in a drop guard, so success, error, panic and
//!   runtime teardown all free the slot
//! - Each started item runs as its own Tokio task

use std::collections::VecDeque;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use parking_lot::Mutex;
use serde::Serialize;
use tokio::runtime::Handle;
use tokio::sync::{oneshot, Notify};

use crate::config::PoolConfig;
use crate::observability::metrics;
use crate::pool::handle::{panic_message, TaskError, TaskHandle};
use crate::pool::PoolError;

type Job = BoxFuture<'static, ()>;

/// How `shutdown` treats work that has not started yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownMode {
    /// Stop admitting; running and queued work completes.
    Graceful,
    /// Stop admitting; queued work is discarded and reported as cancelled.
    Immediate,
}

/// Point-in-time view of a pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoolStats {
    pub name: String,
    pub max_concurrency: usize,
    pub max_queue_depth: usize,
    pub running: usize,
    pub queued: usize,
    pub completed: u64,
    pub rejected: u64,
    pub closed: bool,
}

#[derive(Default)]
struct State {
    running: usize,
    queue: VecDeque<Job>,
    closed: bool,
    completed: u64,
    rejected: u64,
}

impl State {
    fn is_idle(&self) -> bool {
        self.running == 0 && self.queue.is_empty()
    }
}

struct Shared {
    config: PoolConfig,
    state: Mutex<State>,
    idle: Notify,
    runtime: Handle,
}

enum Admission {
    Start(Job),
    Queued,
    Rejected,
    Closed,
}

/// A fixed number of execution slots in front of a bounded FIFO queue.
///
/// Cloning is cheap and every clone refers to the same pool.
#[derive(Clone)]
pub struct BoundedWorkerPool {
    shared: Arc<Shared>,
}

impl std::fmt::Debug for BoundedWorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundedWorkerPool")
            .field("stats", &self.stats())
            .finish()
    }
}

impl BoundedWorkerPool {
    /// Create a pool that spawns its work on the current Tokio runtime.
    pub fn new(config: PoolConfig) -> Result<Self, PoolError> {
        if config.max_concurrency == 0 {
            return Err(PoolError::InvalidConfig(
                "max_concurrency must be at least 1".to_string(),
            ));
        }
        let runtime = Handle::try_current().map_err(|_| PoolError::NoRuntime)?;

        tracing::info!(
            pool = %config.name,
            max_concurrency = config.max_concurrency,
            max_queue_depth = config.max_queue_depth,
            "Worker pool created"
        );

        Ok(Self {
            shared: Arc::new(Shared {
                config,
                state: Mutex::new(State::default()),
                idle: Notify::new(),
                runtime,
            }),
        })
    }

    /// Pool label from configuration.
    pub fn name(&self) -> &str {
        &self.shared.config.name
    }

    /// Submit work without waiting for a slot.
    ///
    /// Starts the work at once if a slot is free, queues it if the queue has
    /// room, and otherwise fails with [`PoolError::Rejected`]. Rejected work
    /// is dropped without ever being polled.
    pub fn submit<F, T>(&self, work: F) -> Result<TaskHandle<T>, PoolError>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let job: Job = Box::pin(async move {
            let outcome = AssertUnwindSafe(work)
                .catch_unwind()
                .await
                .map_err(|payload| TaskError::Panicked(panic_message(payload.as_ref())));
            let _ = tx.send(outcome);
        });

        let config = &self.shared.config;
        let (admission, running, queued) = {
            let mut state = self.shared.state.lock();
            let admission = if state.closed {
                Admission::Closed
            } else if state.running < config.max_concurrency {
                state.running += 1;
                Admission::Start(job)
            } else if state.queue.len() < config.max_queue_depth {
                state.queue.push_back(job);
                Admission::Queued
            } else {
                state.rejected += 1;
                Admission::Rejected
            };
            (admission, state.running, state.queue.len())
        };

        metrics::record_pool_occupancy(&config.name, running, queued);

        match admission {
            Admission::Start(job) => {
                metrics::record_pool_admission(&config.name, "started");
                self.shared.spawn(job);
            }
            Admission::Queued => {
                metrics::record_pool_admission(&config.name, "queued");
                tracing::debug!(pool = %config.name, queued, "Work queued, all slots busy");
            }
            Admission::Rejected => {
                metrics::record_pool_admission(&config.name, "rejected");
                tracing::warn!(
                    pool = %config.name,
                    max_queue_depth = config.max_queue_depth,
                    "Work rejected, queue full"
                );
                return Err(PoolError::Rejected {
                    pool: config.name.clone(),
                });
            }
            Admission::Closed => {
                metrics::record_pool_admission(&config.name, "closed");
                return Err(PoolError::Closed {
                    pool: config.name.clone(),
                });
            }
        }

        Ok(TaskHandle::new(rx))
    }

    /// Stop admitting work. Returns how many queued items were discarded.
    pub fn shutdown(&self, mode: ShutdownMode) -> usize {
        let discarded: Vec<Job> = {
            let mut state = self.shared.state.lock();
            state.closed = true;
            let discarded = match mode {
                ShutdownMode::Graceful => Vec::new(),
                ShutdownMode::Immediate => state.queue.drain(..).collect(),
            };
            if state.is_idle() {
                self.shared.idle.notify_waiters();
            }
            discarded
        };

        let count = discarded.len();
        // Dropping a queued job drops its sender, resolving the handle as cancelled.
        drop(discarded);

        tracing::info!(pool = %self.name(), mode = ?mode, discarded = count, "Worker pool shut down");
        count
    }

    /// Wait until nothing is running or queued.
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.shared.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if self.shared.state.lock().is_idle() {
                return;
            }
            notified.await;
        }
    }

    /// Snapshot of counters and occupancy.
    pub fn stats(&self) -> PoolStats {
        let state = self.shared.state.lock();
        PoolStats {
            name: self.shared.config.name.clone(),
            max_concurrency: self.shared.config.max_concurrency,
            max_queue_depth: self.shared.config.max_queue_depth,
            running: state.running,
            queued: state.queue.len(),
            completed: state.completed,
            rejected: state.rejected,
            closed: state.closed,
        }
    }
}

impl Shared {
    fn spawn(self: &Arc<Self>, job: Job) {
        let slot = SlotGuard {
            shared: Arc::clone(self),
        };
        self.runtime.spawn(async move {
            let _slot = slot;
            job.await;
        });
    }

    /// Free one slot, or pass it on to the oldest queued job.
    fn release(self: &Arc<Self>) {
        let (next, running, queued) = {
            let mut state = self.state.lock();
            state.completed += 1;
            let next = state.queue.pop_front();
            if next.is_none() {
                state.running -= 1;
            }
            if state.is_idle() {
                self.idle.notify_waiters();
            }
            (next, state.running, state.queue.len())
        };

        metrics::record_pool_occupancy(&self.config.name, running, queued);

        if let Some(job) = next {
            self.spawn(job);
        }
    }
}

/// Holds one slot for the lifetime of a running job.
struct SlotGuard {
    shared: Arc<Shared>,
}

impl Drop for SlotGuard {
    fn drop(&mut self) {
        self.shared.release();
    }
}
