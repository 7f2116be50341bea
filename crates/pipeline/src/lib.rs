//! FluxEngine job admission and execution pipeline.
//!
//! The [`Dispatcher`] owns the producer side of a zero-capacity rendezvous
//! queue and rejects immediately when no worker is ready. The
//! [`WorkerPool`] owns the consumer side: each worker runs on its own OS
//! thread, executes one job at a time through the [`ExecutorRegistry`], and
//! reports lifecycle events to a [`JobObserver`].

pub mod dispatcher;
pub mod executor;
pub mod observer;
pub mod queue;
pub mod worker;

use std::sync::Arc;

pub use dispatcher::{Accepted, Dispatcher};
pub use executor::{ExecutorRegistry, TaskExecutor};
pub use observer::{JobFailure, JobObserver, JobResult, TracingObserver};
pub use worker::{Worker, WorkerPool};

/// Wire a dispatcher to `worker_count` workers over a fresh rendezvous queue.
///
/// At least one worker is always started.
pub fn start(
    worker_count: usize,
    executors: Arc<ExecutorRegistry>,
    observer: Arc<dyn JobObserver>,
) -> std::io::Result<(Dispatcher, WorkerPool)> {
    let (sender, receiver) = queue::rendezvous();
    let pool = WorkerPool::spawn(worker_count.max(1), receiver, executors, observer)?;
    Ok((Dispatcher::new(sender), pool))
}
