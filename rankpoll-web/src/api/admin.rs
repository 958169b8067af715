//! Administrative operations: login, synthetic seeding, bulk reset, and
//! draft visibility. All gated on the admin password; seeding and reset
//! are destructive and have no undo.

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use rankpoll_common::db::models::DraftRecord;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    auth,
    db::{drafts, responses},
    error::{ApiError, ApiResult},
    seed, AppState,
};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct SeedRequest {
    pub password: String,
    #[serde(default = "default_seed_count")]
    pub count: usize,
}

fn default_seed_count() -> usize {
    10
}

#[derive(Debug, Serialize)]
pub struct SeedResponse {
    pub inserted: usize,
}

#[derive(Debug, Deserialize)]
pub struct AdminRequest {
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct ResetResponse {
    pub deleted_responses: u64,
    pub deleted_drafts: u64,
}

#[derive(Debug, Serialize)]
pub struct DraftsResponse {
    pub drafts: Vec<DraftRecord>,
}

/// POST /api/admin/login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let email_ok = auth::verify(&request.email, state.secrets.admin_email.as_deref());
    let password_ok = auth::verify(&request.password, state.secrets.admin_password.as_deref());
    if !email_ok || !password_ok {
        return Err(ApiError::Unauthorized("invalid credentials".to_string()));
    }

    Ok(Json(serde_json::json!({ "success": true })))
}

/// POST /api/admin/seed
///
/// Insert synthetic final responses for previewing the results page.
pub async fn seed_responses(
    State(state): State<AppState>,
    Json(request): Json<SeedRequest>,
) -> ApiResult<(StatusCode, Json<SeedResponse>)> {
    verify_admin(&state, &request.password)?;

    let generated = seed::generate(&state.survey, request.count);
    let inserted = responses::insert_responses(&state.db, &generated).await?;

    info!(count = inserted, "Seeded synthetic responses");

    Ok((StatusCode::CREATED, Json(SeedResponse { inserted })))
}

/// POST /api/admin/reset
///
/// Delete every final response and every draft. Irreversible.
pub async fn reset_all(
    State(state): State<AppState>,
    Json(request): Json<AdminRequest>,
) -> ApiResult<Json<ResetResponse>> {
    verify_admin(&state, &request.password)?;

    let deleted_responses = responses::delete_all_responses(&state.db).await?;
    let deleted_drafts = drafts::delete_all_drafts(&state.db).await?;

    info!(deleted_responses, deleted_drafts, "Survey store reset");

    Ok(Json(ResetResponse {
        deleted_responses,
        deleted_drafts,
    }))
}

/// POST /api/admin/drafts
///
/// All in-progress drafts ordered by recency, for operational visibility.
pub async fn list_drafts(
    State(state): State<AppState>,
    Json(request): Json<AdminRequest>,
) -> ApiResult<Json<DraftsResponse>> {
    verify_admin(&state, &request.password)?;

    let drafts = drafts::list_drafts(&state.db).await?;
    Ok(Json(DraftsResponse { drafts }))
}

fn verify_admin(state: &AppState, password: &str) -> ApiResult<()> {
    if !auth::verify(password, state.secrets.admin_password.as_deref()) {
        return Err(ApiError::Unauthorized("invalid password".to_string()));
    }
    Ok(())
}

/// Build admin routes
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/api/admin/login", post(login))
        .route("/api/admin/seed", post(seed_responses))
        .route("/api/admin/reset", post(reset_all))
        .route("/api/admin/drafts", post(list_drafts))
}
