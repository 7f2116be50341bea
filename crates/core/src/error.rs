use crate::job::JobStatus;

/// Domain errors for job admission and execution.
///
/// Admission-time variants (`InvalidRequest`, `Overloaded`, `ShuttingDown`)
/// are returned synchronously to the submitter. Execution-time variants
/// (`HashingFailed`, `EmptyDataset`, `UnknownJobType`) only ever end up in a
/// job's terminal `failed` record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("System overloaded, try again later")]
    Overloaded,

    #[error("Job queue is closed, service is shutting down")]
    ShuttingDown,

    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    #[error("Empty dataset")]
    EmptyDataset,

    #[error("Unknown job type: {0}")]
    UnknownJobType(String),

    #[error("Task panicked: {0}")]
    TaskPanicked(String),

    #[error("Invalid transition: {from} -> {to}")]
    InvalidTransition { from: JobStatus, to: JobStatus },

    #[error("Internal error: {0}")]
    Internal(String),
}
