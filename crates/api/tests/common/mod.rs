#![allow(dead_code)]

use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use fluxengine_api::config::{LogFormat, ServerConfig};
use fluxengine_api::router::build_app_router;
use fluxengine_api::state::AppState;
use fluxengine_core::error::CoreError;
use fluxengine_core::job::JobKind;
use fluxengine_core::payload::JobPayload;
use fluxengine_pipeline::{Dispatcher, ExecutorRegistry, TaskExecutor, TracingObserver, WorkerPool};

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        request_timeout_secs: 10,
        shutdown_grace_secs: 2,
        worker_count: 1,
        log_format: LogFormat::Pretty,
    }
}

/// A running router plus handles on the pipeline behind it.
pub struct TestApp {
    pub router: Router,
    pub dispatcher: Arc<Dispatcher>,
    pub pool: WorkerPool,
}

/// Build the full application router over a live single-worker pipeline.
pub fn build_test_app(executors: ExecutorRegistry) -> TestApp {
    let config = test_config();
    let (dispatcher, pool) = fluxengine_pipeline::start(
        config.worker_count,
        Arc::new(executors),
        Arc::new(TracingObserver),
    )
    .unwrap();
    let dispatcher = Arc::new(dispatcher);

    let state = AppState {
        config: Arc::new(config.clone()),
        dispatcher: Arc::clone(&dispatcher),
    };

    TestApp {
        router: build_app_router(state, &config),
        dispatcher,
        pool,
    }
}

// ---------------------------------------------------------------------------
// Gated executor
// ---------------------------------------------------------------------------

/// Blocks every job until opened; stays open afterwards.
#[derive(Default)]
pub struct Gate {
    open: Mutex<bool>,
    cv: Condvar,
}

impl Gate {
    pub fn open(&self) {
        *self.open.lock().unwrap() = true;
        self.cv.notify_all();
    }

    fn wait(&self) {
        let mut open = self.open.lock().unwrap();
        while !*open {
            open = self.cv.wait(open).unwrap();
        }
    }
}

struct GatedExecutor(Arc<Gate>);

impl TaskExecutor for GatedExecutor {
    fn execute(&self, _payload: &JobPayload) -> Result<Value, CoreError> {
        self.0.wait();
        Ok(json!({ "gated": true }))
    }
}

/// Default executors with `report_generation` held behind `gate`.
pub fn gated_executors(gate: &Arc<Gate>) -> ExecutorRegistry {
    let mut executors = ExecutorRegistry::with_defaults();
    executors.register(JobKind::ReportGeneration, Arc::new(GatedExecutor(Arc::clone(gate))));
    executors
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_raw(app: Router, uri: &str, body: impl Into<Body>) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body.into())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response {
    post_raw(app, uri, body.to_string()).await
}

pub async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// POST `/submit` until a worker takes the job.
///
/// The worker thread may not be parked on the queue yet right after start-up.
pub async fn submit_until_accepted(app: &Router, body: Value) -> Response {
    for _ in 0..1000 {
        let response = post_json(app.clone(), "/submit", body.clone()).await;
        if response.status() != StatusCode::SERVICE_UNAVAILABLE {
            return response;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("no worker accepted the job");
}
