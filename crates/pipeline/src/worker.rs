//! Workers: the consumer side of the rendezvous queue.
//!
//! Each worker is a dedicated OS thread running a blocking receive loop, one
//! job at a time. A job that fails (or panics) is recorded as `failed` and
//! the loop moves on; nothing a job does can stop its worker.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use tokio::sync::oneshot;

use fluxengine_core::error::CoreError;
use fluxengine_core::job::{Job, JobStatus};

use crate::executor::ExecutorRegistry;
use crate::observer::{JobFailure, JobObserver, JobResult};
use crate::queue::JobReceiver;

/// A single consumer of the job queue.
pub struct Worker {
    id: usize,
    queue: JobReceiver,
    executors: Arc<ExecutorRegistry>,
    observer: Arc<dyn JobObserver>,
}

impl Worker {
    pub fn new(
        id: usize,
        queue: JobReceiver,
        executors: Arc<ExecutorRegistry>,
        observer: Arc<dyn JobObserver>,
    ) -> Self {
        Self {
            id,
            queue,
            executors,
            observer,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    /// Receive and process jobs until the queue is closed.
    pub fn run(&self) {
        tracing::info!(worker_id = self.id, "Worker started and waiting for CPU-intensive jobs");

        while let Some(job) = self.queue.recv() {
            self.process(job);
        }

        tracing::info!(worker_id = self.id, "Worker stopped (queue closed)");
    }

    /// Execute one job and return its terminal status.
    pub fn process(&self, mut job: Job) -> JobStatus {
        let started = Instant::now();
        tracing::info!(
            worker_id = self.id,
            job_id = %job.id(),
            job_type = %job.kind(),
            "Worker processing job",
        );
        self.advance(&mut job, JobStatus::Processing);

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            self.executors.execute(job.payload())
        }))
        .unwrap_or_else(|panic| Err(CoreError::TaskPanicked(panic_message(panic.as_ref()))));
        let duration = started.elapsed();

        match outcome {
            Ok(result) => {
                self.advance(&mut job, JobStatus::Completed);
                self.observer.on_completed(&JobResult {
                    job_id: job.id().clone(),
                    job_type: job.kind(),
                    duration,
                    result,
                    completed_at: chrono::Utc::now(),
                });
            }
            Err(err) => {
                self.advance(&mut job, JobStatus::Failed);
                self.observer.on_failed(&JobFailure {
                    job_id: job.id().clone(),
                    job_type: job.kind(),
                    duration,
                    error: err.to_string(),
                    failed_at: chrono::Utc::now(),
                });
            }
        }

        job.status()
    }

    fn advance(&self, job: &mut Job, to: JobStatus) {
        match job.transition(to) {
            Ok(from) => self.observer.on_transition(job.id(), job.kind(), from, to),
            Err(e) => tracing::error!(
                worker_id = self.id,
                job_id = %job.id(),
                error = %e,
                "Rejected job status change",
            ),
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

// ---------------------------------------------------------------------------
// Pool
// ---------------------------------------------------------------------------

struct WorkerHandle {
    id: usize,
    drained: oneshot::Receiver<()>,
}

/// A set of workers sharing one queue.
///
/// Workers run on detached threads; the pool only keeps the "drained"
/// notification each one sends after its loop exits.
pub struct WorkerPool {
    workers: Vec<WorkerHandle>,
}

impl WorkerPool {
    /// Spawn `count` worker threads over `queue`.
    pub fn spawn(
        count: usize,
        queue: JobReceiver,
        executors: Arc<ExecutorRegistry>,
        observer: Arc<dyn JobObserver>,
    ) -> std::io::Result<Self> {
        let mut workers = Vec::with_capacity(count);
        for id in 1..=count {
            let worker = Worker::new(id, queue.clone(), Arc::clone(&executors), Arc::clone(&observer));
            let (drained_tx, drained_rx) = oneshot::channel();

            thread::Builder::new()
                .name(format!("fluxengine-worker-{id}"))
                .spawn(move || {
                    worker.run();
                    // The pool may already have given up waiting.
                    let _ = drained_tx.send(());
                })?;

            workers.push(WorkerHandle {
                id,
                drained: drained_rx,
            });
        }

        tracing::info!(workers = count, "Worker pool started");
        Ok(Self { workers })
    }

    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    /// Wait up to `grace` for every worker to report that it has exited.
    ///
    /// Call after closing the queue. Returns how many workers were still
    /// busy when the grace period ran out; their jobs are abandoned.
    pub async fn wait_drained(self, grace: Duration) -> usize {
        let deadline = tokio::time::Instant::now() + grace;
        let mut still_running = 0;

        for worker in self.workers {
            match tokio::time::timeout_at(deadline, worker.drained).await {
                // A dropped sender means the thread is gone as well.
                Ok(_) => tracing::debug!(worker_id = worker.id, "Worker drained"),
                Err(_) => {
                    tracing::warn!(worker_id = worker.id, "Worker still busy after grace period");
                    still_running += 1;
                }
            }
        }

        still_running
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use serde_json::json;

    use fluxengine_core::job::{JobId, JobKind};
    use fluxengine_core::payload::{JobPayload, ReportPayload};

    use super::*;
    use crate::executor::TaskExecutor;
    use crate::queue;

    #[derive(Default)]
    struct Recorder {
        transitions: Mutex<Vec<(JobStatus, JobStatus)>>,
        failures: Mutex<Vec<String>>,
        completed: Mutex<usize>,
    }

    impl JobObserver for Recorder {
        fn on_transition(&self, _id: &JobId, _kind: JobKind, from: JobStatus, to: JobStatus) {
            self.transitions.lock().unwrap().push((from, to));
        }

        fn on_completed(&self, _result: &JobResult) {
            *self.completed.lock().unwrap() += 1;
        }

        fn on_failed(&self, failure: &JobFailure) {
            self.failures.lock().unwrap().push(failure.error.clone());
        }
    }

    struct Panicking;

    impl TaskExecutor for Panicking {
        fn execute(&self, _payload: &JobPayload) -> Result<serde_json::Value, CoreError> {
            panic!("executor blew up");
        }
    }

    struct Echo;

    impl TaskExecutor for Echo {
        fn execute(&self, _payload: &JobPayload) -> Result<serde_json::Value, CoreError> {
            Ok(json!({ "echo": true }))
        }
    }

    fn worker_with(executors: ExecutorRegistry, recorder: Arc<Recorder>) -> Worker {
        let (_sender, receiver) = queue::rendezvous();
        Worker::new(1, receiver, Arc::new(executors), recorder)
    }

    fn report_job() -> Job {
        Job::new(JobPayload::ReportGeneration(ReportPayload { data_points: 4 }))
    }

    #[test]
    fn successful_job_walks_to_completed() {
        let recorder = Arc::new(Recorder::default());
        let mut executors = ExecutorRegistry::new();
        executors.register(JobKind::ReportGeneration, Arc::new(Echo));
        let worker = worker_with(executors, Arc::clone(&recorder));

        assert_eq!(worker.process(report_job()), JobStatus::Completed);
        assert_eq!(
            *recorder.transitions.lock().unwrap(),
            vec![
                (JobStatus::Pending, JobStatus::Processing),
                (JobStatus::Processing, JobStatus::Completed),
            ]
        );
        assert_eq!(*recorder.completed.lock().unwrap(), 1);
    }

    #[test]
    fn unregistered_kind_fails_without_crashing() {
        let recorder = Arc::new(Recorder::default());
        let worker = worker_with(ExecutorRegistry::new(), Arc::clone(&recorder));

        assert_eq!(worker.process(report_job()), JobStatus::Failed);
        let failures = recorder.failures.lock().unwrap();
        assert_eq!(failures.len(), 1);
        assert!(failures[0].contains("Unknown job type"));
    }

    #[test]
    fn panicking_executor_is_isolated() {
        let recorder = Arc::new(Recorder::default());
        let mut executors = ExecutorRegistry::new();
        executors.register(JobKind::ReportGeneration, Arc::new(Panicking));
        let worker = worker_with(executors, Arc::clone(&recorder));

        assert_eq!(worker.process(report_job()), JobStatus::Failed);
        assert_eq!(worker.process(report_job()), JobStatus::Failed);
        let failures = recorder.failures.lock().unwrap();
        assert_eq!(failures.len(), 2);
        assert!(failures[0].contains("executor blew up"));
    }

    #[tokio::test]
    async fn pool_drains_after_queue_closes() {
        let (sender, receiver) = queue::rendezvous();
        let pool = WorkerPool::spawn(
            3,
            receiver,
            Arc::new(ExecutorRegistry::with_defaults()),
            Arc::new(Recorder::default()),
        )
        .unwrap();
        assert_eq!(pool.len(), 3);

        sender.close();
        assert_eq!(pool.wait_drained(Duration::from_secs(5)).await, 0);
    }
}
