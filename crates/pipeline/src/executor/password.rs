//! bcrypt password hashing with an immediate verification round trip.
//!
//! Only metadata about the hash leaves this module: neither the password nor
//! the hash string is returned or logged.

use serde::Serialize;

use fluxengine_core::error::CoreError;
use fluxengine_core::payload::JobPayload;

use super::TaskExecutor;

/// Work factor used when none (or an out-of-range one) is requested.
pub const DEFAULT_COST: u32 = 10;

/// Lowest work factor bcrypt accepts.
pub const MIN_COST: u32 = 4;

/// Highest work factor bcrypt accepts.
pub const MAX_COST: u32 = 31;

const ALGORITHM: &str = "bcrypt";

/// Result payload of a `password_hash` job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HashSummary {
    pub hash_length: usize,
    pub cost: u32,
    pub algorithm: &'static str,
    pub verified: bool,
}

/// Resolve the requested work factor.
///
/// Anything outside `[MIN_COST, MAX_COST]` falls back to [`DEFAULT_COST`]
/// instead of being rejected.
pub fn effective_cost(requested: Option<i64>) -> u32 {
    requested
        .and_then(|cost| u32::try_from(cost).ok())
        .filter(|cost| (MIN_COST..=MAX_COST).contains(cost))
        .unwrap_or(DEFAULT_COST)
}

/// Hash `password` at `cost`, then verify the fresh hash against it.
///
/// A verification mismatch is a [`CoreError::HashingFailed`].
pub fn hash_password(password: &str, cost: u32) -> Result<HashSummary, CoreError> {
    tracing::debug!(cost, "Hashing password with bcrypt");

    let hashed = bcrypt::hash(password, cost)
        .map_err(|e| CoreError::HashingFailed(format!("bcrypt hashing failed: {e}")))?;

    let verified = bcrypt::verify(password, &hashed)
        .map_err(|e| CoreError::HashingFailed(format!("hash verification failed: {e}")))?;
    if !verified {
        return Err(CoreError::HashingFailed(
            "hash verification failed: mismatch".into(),
        ));
    }

    Ok(HashSummary {
        hash_length: hashed.len(),
        cost,
        algorithm: ALGORITHM,
        verified,
    })
}

/// Executor for `password_hash` jobs.
#[derive(Debug, Default, Clone, Copy)]
pub struct PasswordHashExecutor;

impl TaskExecutor for PasswordHashExecutor {
    fn execute(&self, payload: &JobPayload) -> Result<serde_json::Value, CoreError> {
        let JobPayload::PasswordHash(input) = payload else {
            return Err(super::mismatched(payload));
        };
        let summary = hash_password(&input.password, effective_cost(input.cost))?;
        serde_json::to_value(summary).map_err(|e| CoreError::Internal(e.to_string()))
    }
}
