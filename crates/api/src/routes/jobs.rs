//! Route definitions for job submission.

use axum::routing::post;
use axum::Router;

use crate::handlers::jobs;
use crate::state::AppState;

/// ```text
/// POST   /submit          -> submit_job
/// ```
///
/// Any other method on `/submit` is answered with 405 by the router.
pub fn router() -> Router<AppState> {
    Router::new().route("/submit", post(jobs::submit_job))
}
