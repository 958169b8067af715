//! Draft persistence adapter
//!
//! One row per session_id; a later save fully replaces the prior
//! snapshot's mutable fields and bumps updated_at. Draft persistence is a
//! resumability aid: callers treat failures as non-fatal.

use rankpoll_common::db::models::{DraftRecord, RankedItem, SurveyStep, TeamSize};
use rankpoll_common::{Error, Result};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// Upsert a draft snapshot keyed by session_id
pub async fn save_draft(pool: &SqlitePool, draft: &DraftRecord) -> Result<()> {
    let session_id = draft.session_id.to_string();
    let step = draft.step.as_str();
    let selections = draft
        .selections
        .as_ref()
        .map(|s| serde_json::to_string(s))
        .transpose()
        .map_err(|e| Error::Internal(format!("Failed to serialize selections: {}", e)))?;
    let rankings = serialize_ranked(&draft.rankings)?;
    let remaining_rankings = serialize_ranked(&draft.remaining_rankings)?;
    let team_size = draft.team_size.map(|ts| ts.as_str());
    let updated_at = draft.updated_at.to_rfc3339();

    sqlx::query(
        r#"
        INSERT INTO survey_drafts (
            session_id, step, selections, rankings, remaining_rankings,
            first_name, last_name, email, team_size, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(session_id) DO UPDATE SET
            step = excluded.step,
            selections = excluded.selections,
            rankings = excluded.rankings,
            remaining_rankings = excluded.remaining_rankings,
            first_name = excluded.first_name,
            last_name = excluded.last_name,
            email = excluded.email,
            team_size = excluded.team_size,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(&session_id)
    .bind(step)
    .bind(&selections)
    .bind(&rankings)
    .bind(&remaining_rankings)
    .bind(&draft.first_name)
    .bind(&draft.last_name)
    .bind(&draft.email)
    .bind(team_size)
    .bind(&updated_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Delete the draft for a session; absence is not an error
pub async fn delete_draft(pool: &SqlitePool, session_id: Uuid) -> Result<()> {
    sqlx::query("DELETE FROM survey_drafts WHERE session_id = ?")
        .bind(session_id.to_string())
        .execute(pool)
        .await?;

    Ok(())
}

/// All drafts ordered by recency, for the admin listing
pub async fn list_drafts(pool: &SqlitePool) -> Result<Vec<DraftRecord>> {
    let rows = sqlx::query(
        r#"
        SELECT session_id, step, selections, rankings, remaining_rankings,
               first_name, last_name, email, team_size, updated_at
        FROM survey_drafts
        ORDER BY updated_at DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(draft_from_row).collect()
}

/// Delete every draft; returns how many rows were removed
pub async fn delete_all_drafts(pool: &SqlitePool) -> Result<u64> {
    let result = sqlx::query("DELETE FROM survey_drafts").execute(pool).await?;
    Ok(result.rows_affected())
}

fn draft_from_row(row: sqlx::sqlite::SqliteRow) -> Result<DraftRecord> {
    let session_id: String = row.get("session_id");
    let session_id = Uuid::parse_str(&session_id)
        .map_err(|e| Error::Internal(format!("Invalid session_id in draft row: {}", e)))?;

    let step: String = row.get("step");
    let step = SurveyStep::parse(&step)
        .ok_or_else(|| Error::Internal(format!("Invalid draft step '{}'", step)))?;

    let selections: Option<String> = row.get("selections");
    let selections: Option<Vec<String>> = selections
        .map(|s| serde_json::from_str(&s))
        .transpose()
        .map_err(|e| Error::Internal(format!("Failed to deserialize selections: {}", e)))?;

    let team_size: Option<String> = row.get("team_size");
    let team_size = match team_size {
        Some(s) => Some(
            TeamSize::parse(&s)
                .ok_or_else(|| Error::Internal(format!("Invalid team_size '{}'", s)))?,
        ),
        None => None,
    };

    let updated_at: String = row.get("updated_at");
    let updated_at = chrono::DateTime::parse_from_rfc3339(&updated_at)
        .map_err(|e| Error::Internal(format!("Failed to parse updated_at: {}", e)))?
        .with_timezone(&chrono::Utc);

    Ok(DraftRecord {
        session_id,
        step,
        selections,
        rankings: deserialize_ranked(row.get("rankings"))?,
        remaining_rankings: deserialize_ranked(row.get("remaining_rankings"))?,
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        email: row.get("email"),
        team_size,
        updated_at,
    })
}

fn serialize_ranked(items: &Option<Vec<RankedItem>>) -> Result<Option<String>> {
    items
        .as_ref()
        .map(|items| serde_json::to_string(items))
        .transpose()
        .map_err(|e| Error::Internal(format!("Failed to serialize ranked list: {}", e)))
}

fn deserialize_ranked(json: Option<String>) -> Result<Option<Vec<RankedItem>>> {
    json.map(|s| serde_json::from_str(&s))
        .transpose()
        .map_err(|e| Error::Internal(format!("Failed to deserialize ranked list: {}", e)))
}
