//! Typed per-kind job payloads, validated once at admission time.
//!
//! Submissions arrive as an open JSON object. [`JobPayload::from_request`]
//! turns it into a tagged variant carrying only the fields the matching
//! executor reads, so workers never perform runtime type assertions.

use std::fmt;

use serde_json::{Map, Value};

use crate::error::CoreError;
use crate::job::JobKind;

/// Data points synthesized when a report submission does not specify any.
pub const DEFAULT_DATA_POINTS: i64 = 1_000_000;

/// Strongly-typed payload, one variant per [`JobKind`].
#[derive(Debug, Clone, PartialEq)]
pub enum JobPayload {
    PasswordHash(PasswordHashPayload),
    ReportGeneration(ReportPayload),
}

/// Input of a `password_hash` job.
///
/// `cost` is the requested work factor as submitted; clamping to the
/// accepted range happens in the executor.
#[derive(Clone, PartialEq)]
pub struct PasswordHashPayload {
    pub password: String,
    pub cost: Option<i64>,
}

// The secret must never reach a log line.
impl fmt::Debug for PasswordHashPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordHashPayload")
            .field("password", &"<redacted>")
            .field("cost", &self.cost)
            .finish()
    }
}

/// Input of a `report_generation` job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportPayload {
    pub data_points: i64,
}

impl JobPayload {
    /// Validate an untyped submission payload against `kind`.
    ///
    /// - `password_hash`: `password` must be present and a string; `cost` is
    ///   read only when it is a JSON number (fractions truncate).
    /// - `report_generation`: `data_points` defaults to
    ///   [`DEFAULT_DATA_POINTS`] when absent or not a number.
    pub fn from_request(kind: JobKind, payload: &Map<String, Value>) -> Result<Self, CoreError> {
        match kind {
            JobKind::PasswordHash => {
                let password = match payload.get("password") {
                    Some(Value::String(password)) => password.clone(),
                    Some(_) => {
                        return Err(CoreError::InvalidRequest(
                            "'password' field must be a string".into(),
                        ))
                    }
                    None => {
                        return Err(CoreError::InvalidRequest(
                            "Missing 'password' field in payload".into(),
                        ))
                    }
                };
                let cost = payload.get("cost").and_then(number_as_i64);
                Ok(JobPayload::PasswordHash(PasswordHashPayload { password, cost }))
            }
            JobKind::ReportGeneration => {
                let data_points = payload
                    .get("data_points")
                    .and_then(number_as_i64)
                    .unwrap_or(DEFAULT_DATA_POINTS);
                Ok(JobPayload::ReportGeneration(ReportPayload { data_points }))
            }
        }
    }

    pub fn kind(&self) -> JobKind {
        match self {
            JobPayload::PasswordHash(_) => JobKind::PasswordHash,
            JobPayload::ReportGeneration(_) => JobKind::ReportGeneration,
        }
    }
}

/// Read a JSON number as an integer, truncating toward zero.
///
/// Out-of-range floats saturate, which the executors then clamp.
fn number_as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        _ => None,
    }
}
