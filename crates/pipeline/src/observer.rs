//! Observability sink for job lifecycle events.
//!
//! Workers never log directly: everything they have to say about a job goes
//! through the [`JobObserver`] handed to them at construction.

use std::time::Duration;

use fluxengine_core::job::{JobId, JobKind, JobStatus};
use fluxengine_core::types::Timestamp;

/// Record emitted when a job completes.
#[derive(Debug, Clone)]
pub struct JobResult {
    pub job_id: JobId,
    pub job_type: JobKind,
    pub duration: Duration,
    pub result: serde_json::Value,
    pub completed_at: Timestamp,
}

/// Record emitted when a job fails.
#[derive(Debug, Clone)]
pub struct JobFailure {
    pub job_id: JobId,
    pub job_type: JobKind,
    pub duration: Duration,
    pub error: String,
    pub failed_at: Timestamp,
}

/// Receives job lifecycle events from workers.
///
/// Called from worker threads; implementations must not block for long.
pub trait JobObserver: Send + Sync {
    fn on_transition(&self, job_id: &JobId, job_type: JobKind, from: JobStatus, to: JobStatus);

    fn on_completed(&self, result: &JobResult);

    fn on_failed(&self, failure: &JobFailure);
}

/// Default observer writing every event through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl JobObserver for TracingObserver {
    fn on_transition(&self, job_id: &JobId, job_type: JobKind, from: JobStatus, to: JobStatus) {
        tracing::debug!(
            job_id = %job_id,
            job_type = %job_type,
            from = %from,
            to = %to,
            "Job status changed",
        );
    }

    fn on_completed(&self, result: &JobResult) {
        tracing::info!(
            job_id = %result.job_id,
            job_type = %result.job_type,
            duration_ms = result.duration.as_millis() as u64,
            "Job completed",
        );

        if let Some(fields) = result.result.as_object() {
            for (key, value) in fields {
                tracing::info!(job_id = %result.job_id, "  {key}: {value}");
            }
        }
    }

    fn on_failed(&self, failure: &JobFailure) {
        tracing::error!(
            job_id = %failure.job_id,
            job_type = %failure.job_type,
            duration_ms = failure.duration.as_millis() as u64,
            error = %failure.error,
            "Job failed",
        );
    }
}
