//! Task executors and the registry that dispatches to them by job kind.
//!
//! Executors are synchronous: they run on a worker's own OS thread and are
//! free to burn CPU for as long as the job needs.

pub mod password;
pub mod report;

use std::collections::HashMap;
use std::sync::Arc;

use fluxengine_core::error::CoreError;
use fluxengine_core::job::JobKind;
use fluxengine_core::payload::JobPayload;

pub use password::PasswordHashExecutor;
pub use report::ReportExecutor;

/// A computation for one job kind.
pub trait TaskExecutor: Send + Sync {
    /// Run the job to completion and return its result payload.
    fn execute(&self, payload: &JobPayload) -> Result<serde_json::Value, CoreError>;
}

/// Registry of executors (job kind -> executor).
///
/// Built once at start-up and shared read-only by every worker.
#[derive(Default)]
pub struct ExecutorRegistry {
    executors: HashMap<JobKind, Arc<dyn TaskExecutor>>,
}

impl ExecutorRegistry {
    /// An empty registry. Every job fails with `UnknownJobType` until
    /// executors are registered.
    pub fn new() -> Self {
        Self {
            executors: HashMap::new(),
        }
    }

    /// Registry with the password hashing and report generation executors.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(JobKind::PasswordHash, Arc::new(PasswordHashExecutor));
        registry.register(JobKind::ReportGeneration, Arc::new(ReportExecutor));
        registry
    }

    /// Register `executor` for `kind`, returning the one it replaces.
    pub fn register(
        &mut self,
        kind: JobKind,
        executor: Arc<dyn TaskExecutor>,
    ) -> Option<Arc<dyn TaskExecutor>> {
        self.executors.insert(kind, executor)
    }

    pub fn get(&self, kind: JobKind) -> Option<&Arc<dyn TaskExecutor>> {
        self.executors.get(&kind)
    }

    pub fn len(&self) -> usize {
        self.executors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.executors.is_empty()
    }

    /// Execute `payload` on the executor registered for its kind.
    pub fn execute(&self, payload: &JobPayload) -> Result<serde_json::Value, CoreError> {
        let kind = payload.kind();
        let executor = self
            .get(kind)
            .ok_or_else(|| CoreError::UnknownJobType(kind.to_string()))?;
        executor.execute(payload)
    }
}

/// Error for a payload routed to an executor of another kind.
pub(crate) fn mismatched(payload: &JobPayload) -> CoreError {
    CoreError::UnknownJobType(format!("{} (mismatched executor)", payload.kind()))
}
