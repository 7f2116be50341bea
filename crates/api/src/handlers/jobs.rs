//! Handlers for job submission.
//!
//! The request body is read raw and parsed here so that any malformed or
//! unreadable body is a 400 regardless of the declared content type.

use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use fluxengine_core::job::JobId;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Body of `POST /submit`.
#[derive(Debug, Deserialize)]
pub struct SubmitJobRequest {
    #[serde(rename = "type", default)]
    pub job_type: String,
    #[serde(default)]
    pub payload: Option<Value>,
}

/// Body of the 202 response.
#[derive(Debug, Serialize)]
pub struct SubmitJobResponse {
    pub status: &'static str,
    pub job_id: JobId,
    pub message: String,
    pub note: &'static str,
}

const TRACKING_NOTE: &str =
    "Job will be processed asynchronously. Use job_id to track status (future phases).";

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse a raw submission body into its job type and payload object.
///
/// A missing or `null` payload is an empty object; any other non-object
/// payload is rejected.
pub fn parse_submission(body: &[u8]) -> AppResult<(String, Map<String, Value>)> {
    let request: SubmitJobRequest = serde_json::from_slice(body)
        .map_err(|e| AppError::BadRequest(format!("Invalid JSON: {e}")))?;

    let payload = match request.payload {
        None | Some(Value::Null) => Map::new(),
        Some(Value::Object(map)) => map,
        Some(_) => {
            return Err(AppError::BadRequest(
                "'payload' must be a JSON object".to_string(),
            ))
        }
    };

    Ok((request.job_type, payload))
}

// ---------------------------------------------------------------------------
// Submit
// ---------------------------------------------------------------------------

/// POST /submit
///
/// Hand a job to a waiting worker and return 202 immediately. Returns 503
/// when no worker is ready; the job is not queued in that case.
pub async fn submit_job(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> AppResult<impl IntoResponse> {
    let body = body.map_err(|e| {
        tracing::warn!(error = %e, "Failed to read request body");
        AppError::BadRequest("Failed to read request body".to_string())
    })?;

    let (job_type, payload) = parse_submission(&body)?;
    let accepted = state.dispatcher.submit(&job_type, &payload)?;

    Ok((
        StatusCode::ACCEPTED,
        Json(SubmitJobResponse {
            status: "accepted",
            message: format!("Job {} queued for CPU-intensive processing", accepted.job_id),
            job_id: accepted.job_id,
            note: TRACKING_NOTE,
        }),
    ))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn missing_payload_is_empty_object() {
        let (job_type, payload) = parse_submission(br#"{"type":"report_generation"}"#).unwrap();
        assert_eq!(job_type, "report_generation");
        assert!(payload.is_empty());
    }

    #[test]
    fn null_payload_is_empty_object() {
        let (_, payload) =
            parse_submission(br#"{"type":"report_generation","payload":null}"#).unwrap();
        assert!(payload.is_empty());
    }

    #[test]
    fn non_object_payload_is_rejected() {
        assert_matches!(
            parse_submission(br#"{"type":"password_hash","payload":[1,2]}"#),
            Err(AppError::BadRequest(msg)) if msg.contains("payload")
        );
    }

    #[test]
    fn malformed_json_is_rejected() {
        assert_matches!(
            parse_submission(b"{not json"),
            Err(AppError::BadRequest(msg)) if msg.starts_with("Invalid JSON")
        );
    }

    #[test]
    fn missing_type_parses_as_empty() {
        let (job_type, _) = parse_submission(b"{}").unwrap();
        assert!(job_type.is_empty());
    }
}
