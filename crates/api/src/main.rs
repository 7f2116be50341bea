use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use fluxengine_api::config::ServerConfig;
use fluxengine_api::router::build_app_router;
use fluxengine_api::state::AppState;
use fluxengine_api::telemetry;
use fluxengine_pipeline::{ExecutorRegistry, TracingObserver};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Configuration ---
    let config = ServerConfig::from_env();

    // --- Tracing ---
    telemetry::init(config.log_format);
    tracing::info!(
        host = %config.host,
        port = %config.port,
        workers = config.worker_count,
        "Loaded server configuration",
    );

    // --- Pipeline ---
    let executors = Arc::new(ExecutorRegistry::with_defaults());
    let (dispatcher, pool) = fluxengine_pipeline::start(
        config.worker_count,
        executors,
        Arc::new(TracingObserver),
    )
    .expect("Failed to start worker threads");
    let dispatcher = Arc::new(dispatcher);

    // --- App state ---
    let state = AppState {
        config: Arc::new(config.clone()),
        dispatcher: Arc::clone(&dispatcher),
    };
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!(%addr, "FluxEngine starting");
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health - health check");
    tracing::info!("  POST /submit - submit job (password_hash | report_generation)");
    tracing::info!(
        workers = config.worker_count,
        "Worker setup: rendezvous queue, busy workers reject new jobs with 503",
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, draining workers");

    dispatcher.close();
    let grace = Duration::from_secs(config.shutdown_grace_secs);
    let still_running = pool.wait_drained(grace).await;
    if still_running > 0 {
        tracing::warn!(
            still_running,
            grace_secs = config.shutdown_grace_secs,
            "Abandoning jobs still in flight",
        );
    }

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
