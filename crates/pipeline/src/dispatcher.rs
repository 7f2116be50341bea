//! Admission boundary: validate, construct, and hand off without blocking.

use serde::Serialize;
use serde_json::{Map, Value};

use fluxengine_core::error::CoreError;
use fluxengine_core::job::{Job, JobId, JobKind};
use fluxengine_core::payload::JobPayload;

use crate::queue::{HandOffError, JobSender};

/// Acknowledgment of a job a worker has taken.
///
/// Returned before the job runs; the caller never waits for computation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Accepted {
    pub job_id: JobId,
    pub job_type: JobKind,
}

/// Producer side of the job queue.
///
/// Back-pressure is immediate rejection: when no worker is waiting at the
/// instant of submission the job is dropped and `Overloaded` returned. No
/// job record exists anywhere for a rejected submission.
#[derive(Debug)]
pub struct Dispatcher {
    queue: JobSender,
}

impl Dispatcher {
    pub fn new(queue: JobSender) -> Self {
        Self { queue }
    }

    /// Validate an untyped submission and hand it to a waiting worker.
    ///
    /// Errors:
    /// - `InvalidRequest` for an unknown `job_type` or an invalid payload.
    /// - `Overloaded` when no worker is ready.
    /// - `ShuttingDown` once the queue has been closed.
    pub fn submit(&self, job_type: &str, payload: &Map<String, Value>) -> Result<Accepted, CoreError> {
        let kind: JobKind = job_type.parse().map_err(|_| {
            CoreError::InvalidRequest(format!(
                "Invalid job type '{job_type}'. Use 'password_hash' or 'report_generation'"
            ))
        })?;
        let payload = JobPayload::from_request(kind, payload)?;
        self.submit_payload(payload)
    }

    /// Hand an already validated payload to a waiting worker.
    pub fn submit_payload(&self, payload: JobPayload) -> Result<Accepted, CoreError> {
        let job = Job::new(payload);
        let accepted = Accepted {
            job_id: job.id().clone(),
            job_type: job.kind(),
        };

        match self.queue.try_hand_off(job) {
            Ok(()) => {
                tracing::info!(
                    job_id = %accepted.job_id,
                    job_type = %accepted.job_type,
                    "Job accepted",
                );
                Ok(accepted)
            }
            Err(HandOffError::Busy(_)) => {
                tracing::warn!(job_type = %accepted.job_type, "No worker ready, rejecting job");
                Err(CoreError::Overloaded)
            }
            Err(HandOffError::Closed(_)) => {
                tracing::warn!(job_type = %accepted.job_type, "Job queue closed, rejecting job");
                Err(CoreError::ShuttingDown)
            }
        }
    }

    /// Close the queue; workers exit once their current job is done.
    pub fn close(&self) -> bool {
        let closed = self.queue.close();
        if closed {
            tracing::info!("Job queue closed");
        }
        closed
    }

    pub fn is_closed(&self) -> bool {
        self.queue.is_closed()
    }
}
