//! rankpoll-web library interface
//!
//! Exposes the application state, router, and domain modules for the
//! binary and for integration testing.

pub mod api;
pub mod auth;
pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod gate;
pub mod results;
pub mod seed;
pub mod session;

pub use crate::error::{ApiError, ApiResult};

use axum::{routing::get, Router};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::auth::GateSecrets;
use crate::catalog::SurveyConfig;
use crate::session::SurveySession;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Injected immutable survey configuration (catalog + K)
    pub survey: Arc<SurveyConfig>,
    /// Live in-flight sessions; terminal sessions are removed
    pub sessions: Arc<RwLock<HashMap<Uuid, SurveySession>>>,
    /// Gate secrets resolved at startup
    pub secrets: GateSecrets,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(db: SqlitePool, survey: SurveyConfig, secrets: GateSecrets) -> Self {
        Self {
            db,
            survey: Arc::new(survey),
            sessions: Arc::new(RwLock::new(HashMap::new())),
            secrets,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::session_routes())
        .merge(api::results_routes())
        .merge(api::admin_routes())
        .merge(api::health_routes())
        .route("/api/buildinfo", get(api::get_build_info))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
