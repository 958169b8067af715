//! Password-gated results surface

use axum::{extract::State, routing::post, Json, Router};
use rankpoll_common::db::models::{FinalResponse, TeamSize};
use serde::{Deserialize, Serialize};

use crate::{
    auth,
    db::responses,
    error::{ApiError, ApiResult},
    results::{summarize, SummaryOrder, SurveySummary},
    AppState,
};

/// POST /api/results request
#[derive(Debug, Deserialize)]
pub struct ResultsRequest {
    pub password: String,
    /// Optional team-size pre-filter
    #[serde(default)]
    pub team_size: Option<TeamSize>,
    #[serde(default)]
    pub order: SummaryOrder,
}

/// POST /api/results response
#[derive(Debug, Serialize)]
pub struct ResultsResponse {
    #[serde(flatten)]
    pub summary: SurveySummary,
    /// Individual responses, newest first
    pub responses: Vec<FinalResponse>,
}

/// POST /api/results
///
/// One bulk read followed by pure aggregation; safe for any number of
/// concurrent readers.
pub async fn get_results(
    State(state): State<AppState>,
    Json(request): Json<ResultsRequest>,
) -> ApiResult<Json<ResultsResponse>> {
    if !auth::verify(&request.password, state.secrets.results_password.as_deref()) {
        return Err(ApiError::Unauthorized("invalid password".to_string()));
    }

    let all = responses::list_responses(&state.db).await?;
    let summary = summarize(
        state.survey.max_selections(),
        &all,
        request.team_size,
        request.order,
    );

    let responses = match request.team_size {
        Some(ts) => all.into_iter().filter(|r| r.team_size == ts).collect(),
        None => all,
    };

    Ok(Json(ResultsResponse { summary, responses }))
}

/// Build results routes
pub fn results_routes() -> Router<AppState> {
    Router::new().route("/api/results", post(get_results))
}
