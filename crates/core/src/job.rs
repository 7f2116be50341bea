//! Job value object, identifier, kind and lifecycle state machine.
//!
//! A [`Job`] is created by the dispatcher at admission time with status
//! `pending` and is mutated afterwards only by the single worker that won
//! the hand-off for it.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::Serialize;

use crate::error::CoreError;
use crate::payload::JobPayload;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Identifier
// ---------------------------------------------------------------------------

/// Timestamp layout of the identifier prefix (`YYYYMMDDHHMMSS`).
const ID_TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// Alphabet of the random suffix.
const ID_SUFFIX_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Length of the random suffix.
pub const ID_SUFFIX_LEN: usize = 6;

/// Time-ordered job identifier: `YYYYMMDDHHMMSS-xxxxxx`.
///
/// The suffix is six characters drawn from `[a-z0-9]`, which makes
/// collisions within the same second negligible but not impossible.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    /// Generate an identifier stamped with the current UTC time.
    pub fn generate() -> Self {
        Self::generate_at(chrono::Utc::now())
    }

    /// Generate an identifier stamped with `at`.
    pub fn generate_at(at: Timestamp) -> Self {
        let mut rng = rand::rng();
        let suffix: String = (0..ID_SUFFIX_LEN)
            .map(|_| {
                let idx = rng.random_range(0..ID_SUFFIX_ALPHABET.len());
                ID_SUFFIX_ALPHABET[idx] as char
            })
            .collect();
        Self(format!("{}-{suffix}", at.format(ID_TIMESTAMP_FORMAT)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Kind
// ---------------------------------------------------------------------------

/// The kinds of CPU-bound work the service accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    PasswordHash,
    ReportGeneration,
}

impl JobKind {
    pub const ALL: [JobKind; 2] = [JobKind::PasswordHash, JobKind::ReportGeneration];

    /// Wire name used in the `type` field of a submission.
    pub fn as_str(self) -> &'static str {
        match self {
            JobKind::PasswordHash => "password_hash",
            JobKind::ReportGeneration => "report_generation",
        }
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        JobKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| CoreError::UnknownJobType(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Status state machine
// ---------------------------------------------------------------------------

/// Job lifecycle: `pending -> processing -> (completed | failed)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }

    /// Terminal states accept no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    /// Returns the set of statuses reachable from `self`.
    pub fn valid_transitions(self) -> &'static [JobStatus] {
        match self {
            JobStatus::Pending => &[JobStatus::Processing],
            JobStatus::Processing => &[JobStatus::Completed, JobStatus::Failed],
            JobStatus::Completed | JobStatus::Failed => &[],
        }
    }

    pub fn can_transition_to(self, to: JobStatus) -> bool {
        self.valid_transitions().contains(&to)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Job
// ---------------------------------------------------------------------------

/// A unit of CPU-bound work flowing from the dispatcher to a worker.
#[derive(Debug)]
pub struct Job {
    id: JobId,
    payload: JobPayload,
    created_at: Timestamp,
    status: JobStatus,
}

impl Job {
    /// Construct a `pending` job with a freshly generated identifier.
    pub fn new(payload: JobPayload) -> Self {
        let created_at = chrono::Utc::now();
        Self {
            id: JobId::generate_at(created_at),
            payload,
            created_at,
            status: JobStatus::Pending,
        }
    }

    pub fn id(&self) -> &JobId {
        &self.id
    }

    pub fn kind(&self) -> JobKind {
        self.payload.kind()
    }

    pub fn payload(&self) -> &JobPayload {
        &self.payload
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    /// Move the job to `to`, returning the status it left.
    ///
    /// Fails with [`CoreError::InvalidTransition`] for anything off the
    /// linear lifecycle; the job is left untouched in that case.
    pub fn transition(&mut self, to: JobStatus) -> Result<JobStatus, CoreError> {
        let from = self.status;
        if !from.can_transition_to(to) {
            return Err(CoreError::InvalidTransition { from, to });
        }
        self.status = to;
        Ok(from)
    }
}
