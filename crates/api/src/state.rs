use std::sync::Arc;

use fluxengine_pipeline::Dispatcher;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; everything inside is behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Admission boundary for submitted jobs.
    pub dispatcher: Arc<Dispatcher>,
}
