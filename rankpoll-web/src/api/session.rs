//! Survey session flow handlers
//!
//! Transitions out of `selecting` and out of `ranking` spawn detached
//! draft snapshot writes; a terminal step spawns a detached draft delete.
//! Neither is awaited by the handler and failures are observed only in
//! the log: losing a resume point is an acceptable degradation, blocking
//! the respondent on it is not.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use rankpoll_common::db::models::{DraftRecord, RankedItem, SurveyStep};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::SqlitePool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    catalog::CatalogItem,
    error::{ApiError, ApiResult},
    gate::{self, CommitOutcome},
    session::{ContactFields, RankList, SurveySession},
    AppState,
};

/// POST /api/session request
#[derive(Debug, Default, Deserialize)]
pub struct BeginRequest {
    /// Client-generated id, stable for the tab's lifetime; omitted means
    /// the server assigns one
    #[serde(default)]
    pub session_id: Option<Uuid>,
}

/// POST /api/session response
#[derive(Debug, Serialize)]
pub struct BeginResponse {
    pub session_id: Uuid,
    pub step: SurveyStep,
    pub max_selections: usize,
    pub catalog: Vec<CatalogItem>,
}

/// POST /api/session/:id/toggle request
#[derive(Debug, Deserialize)]
pub struct ToggleRequest {
    pub item_id: String,
}

/// POST /api/session/:id/toggle response
#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    pub step: SurveyStep,
    pub selected: Vec<String>,
    pub selected_count: usize,
    pub max_selections: usize,
}

/// POST /api/session/:id/reorder request
#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    pub list: RankList,
    pub from_index: usize,
    pub to_index: usize,
}

/// Response for the ranking-step operations
#[derive(Debug, Serialize)]
pub struct RankingsResponse {
    pub step: SurveyStep,
    pub primary: Vec<RankedItem>,
    pub remaining: Vec<RankedItem>,
}

/// POST /api/session
///
/// Begin (or re-begin) a session in the selecting step. Re-beginning with
/// the same id resets that session, which is what a tab reload wants.
pub async fn begin_session(
    State(state): State<AppState>,
    Json(request): Json<BeginRequest>,
) -> ApiResult<Json<BeginResponse>> {
    let session_id = request.session_id.unwrap_or_else(Uuid::new_v4);
    let session = SurveySession::new(session_id, state.survey.clone());

    let mut sessions = state.sessions.write().await;
    sessions.insert(session_id, session);

    info!(session_id = %session_id, "Survey session started");

    Ok(Json(BeginResponse {
        session_id,
        step: SurveyStep::Selecting,
        max_selections: state.survey.max_selections(),
        catalog: state.survey.items().to_vec(),
    }))
}

/// POST /api/session/:id/toggle
pub async fn toggle_item(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<ToggleRequest>,
) -> ApiResult<Json<ToggleResponse>> {
    let mut sessions = state.sessions.write().await;
    let session = get_session(&mut sessions, session_id)?;

    session.toggle(&request.item_id)?;

    Ok(Json(ToggleResponse {
        step: session.step(),
        selected: session.selected_ids().to_vec(),
        selected_count: session.selected_ids().len(),
        max_selections: state.survey.max_selections(),
    }))
}

/// POST /api/session/:id/rank
///
/// Enter the ranking step (422 unless exactly K items are selected).
pub async fn begin_ranking(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> ApiResult<Json<RankingsResponse>> {
    let mut sessions = state.sessions.write().await;
    let session = get_session(&mut sessions, session_id)?;

    session.begin_ranking()?;
    spawn_draft_save(state.db.clone(), session.draft_record());

    Ok(Json(rankings_response(session)))
}

/// POST /api/session/:id/reorder
pub async fn reorder(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<ReorderRequest>,
) -> ApiResult<Json<RankingsResponse>> {
    let mut sessions = state.sessions.write().await;
    let session = get_session(&mut sessions, session_id)?;

    session.reorder(request.list, request.from_index, request.to_index)?;

    Ok(Json(rankings_response(session)))
}

/// POST /api/session/:id/contact
///
/// Enter the contact step; unconditional once ranking is active.
pub async fn begin_contact(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    let mut sessions = state.sessions.write().await;
    let session = get_session(&mut sessions, session_id)?;

    session.begin_contact()?;
    spawn_draft_save(state.db.clone(), session.draft_record());

    Ok(Json(json!({ "step": session.step() })))
}

/// PUT /api/session/:id/contact
pub async fn set_contact(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(fields): Json<ContactFields>,
) -> ApiResult<Json<serde_json::Value>> {
    let mut sessions = state.sessions.write().await;
    let session = get_session(&mut sessions, session_id)?;

    session.set_contact(fields)?;

    Ok(Json(json!({ "step": session.step() })))
}

/// POST /api/session/:id/submit
///
/// Validate the draft and hand it to the submission gate. 200 on
/// acceptance, 409 when this identity already submitted, 502 on a
/// storage fault (the session stays retryable).
pub async fn submit(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> ApiResult<Response> {
    let mut sessions = state.sessions.write().await;
    let payload = get_session(&mut sessions, session_id)?.submit_payload()?;

    match gate::commit(&state.db, &payload).await {
        Ok(CommitOutcome::Accepted(response)) => {
            if let Some(mut session) = sessions.remove(&session_id) {
                session.mark_done();
            }
            spawn_draft_delete(state.db.clone(), session_id);
            info!(session_id = %session_id, response_id = %response.id, "Survey submitted");
            Ok((
                StatusCode::OK,
                Json(json!({ "step": "done", "response_id": response.id })),
            )
                .into_response())
        }
        Ok(CommitOutcome::DuplicateIdentity) => {
            if let Some(mut session) = sessions.remove(&session_id) {
                session.mark_already_submitted();
            }
            spawn_draft_delete(state.db.clone(), session_id);
            info!(session_id = %session_id, "Duplicate identity; session closed");
            Ok((
                StatusCode::CONFLICT,
                Json(json!({ "step": "already_submitted" })),
            )
                .into_response())
        }
        Err(e) => {
            if let Some(session) = sessions.get_mut(&session_id) {
                session.mark_failed();
            }
            warn!(session_id = %session_id, error = %e, "Submit failed; session retryable");
            Err(ApiError::Storage(format!("failed to store response: {}", e)))
        }
    }
}

fn get_session(
    sessions: &mut std::collections::HashMap<Uuid, SurveySession>,
    session_id: Uuid,
) -> ApiResult<&mut SurveySession> {
    sessions
        .get_mut(&session_id)
        .ok_or_else(|| ApiError::NotFound(format!("no session {}", session_id)))
}

fn rankings_response(session: &SurveySession) -> RankingsResponse {
    RankingsResponse {
        step: session.step(),
        primary: session.primary_ranking().to_vec(),
        remaining: session.remaining_ranking().to_vec(),
    }
}

/// Fire-and-forget draft snapshot write
fn spawn_draft_save(db: SqlitePool, draft: DraftRecord) {
    tokio::spawn(async move {
        if let Err(e) = crate::db::drafts::save_draft(&db, &draft).await {
            warn!(
                session_id = %draft.session_id,
                error = %e,
                "Draft snapshot write failed (ignored)"
            );
        }
    });
}

/// Fire-and-forget draft delete
fn spawn_draft_delete(db: SqlitePool, session_id: Uuid) {
    tokio::spawn(async move {
        if let Err(e) = crate::db::drafts::delete_draft(&db, session_id).await {
            warn!(
                session_id = %session_id,
                error = %e,
                "Draft delete failed (ignored)"
            );
        }
    });
}

/// Build session flow routes
pub fn session_routes() -> Router<AppState> {
    Router::new()
        .route("/api/session", post(begin_session))
        .route("/api/session/:id/toggle", post(toggle_item))
        .route("/api/session/:id/rank", post(begin_ranking))
        .route("/api/session/:id/reorder", post(reorder))
        .route(
            "/api/session/:id/contact",
            post(begin_contact).put(set_contact),
        )
        .route("/api/session/:id/submit", post(submit))
}
