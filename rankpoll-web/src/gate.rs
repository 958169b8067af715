//! Submission gate
//!
//! Commits a validated payload as an immutable final response, enforcing
//! one response per identity. The existence check and the insert are not
//! atomic against concurrent submitters, so the UNIQUE index on
//! survey_responses(email) is the authoritative guard: an insert that
//! trips it is reinterpreted as a duplicate identity, not a storage fault.

use chrono::Utc;
use rankpoll_common::db::models::FinalResponse;
use rankpoll_common::{Error, Result};
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use crate::db::responses;
use crate::session::SubmitPayload;

/// Verdict of a commit attempt. Storage faults surface as `Err` instead;
/// those are transient and the caller may retry.
#[derive(Debug)]
pub enum CommitOutcome {
    Accepted(FinalResponse),
    DuplicateIdentity,
}

/// Commit a submission payload as a final response
pub async fn commit(pool: &SqlitePool, payload: &SubmitPayload) -> Result<CommitOutcome> {
    // Payload assembly already lower-cased the email
    if responses::email_exists(pool, &payload.email).await? {
        return Ok(CommitOutcome::DuplicateIdentity);
    }

    let response = FinalResponse {
        id: Uuid::new_v4(),
        first_name: payload.first_name.clone(),
        last_name: payload.last_name.clone(),
        email: payload.email.clone(),
        team_size: payload.team_size,
        rankings: payload.rankings.clone(),
        remaining_rankings: payload.remaining_rankings.clone(),
        submitted_at: Utc::now(),
    };

    match responses::insert_response(pool, &response).await {
        Ok(()) => {
            info!(response_id = %response.id, "Final response committed");
            Ok(CommitOutcome::Accepted(response))
        }
        // Lost the check-then-insert race to a concurrent submitter
        Err(e) if is_unique_violation(&e) => Ok(CommitOutcome::DuplicateIdentity),
        Err(e) => Err(e),
    }
}

fn is_unique_violation(error: &Error) -> bool {
    match error {
        Error::Database(sqlx::Error::Database(db_err)) => db_err.is_unique_violation(),
        _ => false,
    }
}
