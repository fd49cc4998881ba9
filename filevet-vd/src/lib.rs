//! filevet-vd library interface for testing
//!
//! Exposes the router and application state so integration tests can
//! drive the HTTP API in-process.

pub mod api;
pub mod error;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;

use filevet_common::config::ServiceConfig;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Service configuration, read-only after startup
    pub config: Arc<ServiceConfig>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
    /// Last validation failure for diagnostic purposes
    pub last_error: Arc<RwLock<Option<String>>>,
}

impl AppState {
    pub fn new(config: ServiceConfig) -> Self {
        Self {
            config: Arc::new(config),
            startup_time: Utc::now(),
            last_error: Arc::new(RwLock::new(None)),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::validate_routes())
        .merge(api::health_routes())
        .with_state(state)
}
