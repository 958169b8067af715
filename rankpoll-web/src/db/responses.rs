//! Final response store access
//!
//! Rows in survey_responses are immutable once inserted; the only delete
//! path is the administrative bulk reset.

use rankpoll_common::db::models::{FinalResponse, RankedItem, TeamSize};
use rankpoll_common::{Error, Result};
use sqlx::{Row, SqlitePool};

/// Insert one final response. Surfaces the raw sqlx error so the
/// submission gate can distinguish a unique-constraint violation.
pub async fn insert_response(pool: &SqlitePool, response: &FinalResponse) -> Result<()> {
    let rankings = serde_json::to_string(&response.rankings)
        .map_err(|e| Error::Internal(format!("Failed to serialize rankings: {}", e)))?;
    let remaining_rankings = serde_json::to_string(&response.remaining_rankings)
        .map_err(|e| Error::Internal(format!("Failed to serialize remaining rankings: {}", e)))?;

    sqlx::query(
        r#"
        INSERT INTO survey_responses (
            id, first_name, last_name, email, team_size,
            rankings, remaining_rankings, submitted_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(response.id.to_string())
    .bind(&response.first_name)
    .bind(&response.last_name)
    .bind(&response.email)
    .bind(response.team_size.as_str())
    .bind(&rankings)
    .bind(&remaining_rankings)
    .bind(response.submitted_at.to_rfc3339())
    .execute(pool)
    .await?;

    Ok(())
}

/// Whether a final response exists for this (already lower-cased) email
pub async fn email_exists(pool: &SqlitePool, email: &str) -> Result<bool> {
    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM survey_responses WHERE email = ?)")
            .bind(email)
            .fetch_one(pool)
            .await?;

    Ok(exists)
}

/// All final responses, newest first
pub async fn list_responses(pool: &SqlitePool) -> Result<Vec<FinalResponse>> {
    let rows = sqlx::query(
        r#"
        SELECT id, first_name, last_name, email, team_size,
               rankings, remaining_rankings, submitted_at
        FROM survey_responses
        ORDER BY submitted_at DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(response_from_row).collect()
}

pub async fn count_responses(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM survey_responses")
        .fetch_one(pool)
        .await?;

    Ok(count)
}

/// Insert a batch of synthetic responses (admin seeding)
pub async fn insert_responses(pool: &SqlitePool, responses: &[FinalResponse]) -> Result<usize> {
    for response in responses {
        insert_response(pool, response).await?;
    }
    Ok(responses.len())
}

/// Delete every final response; returns how many rows were removed
pub async fn delete_all_responses(pool: &SqlitePool) -> Result<u64> {
    let result = sqlx::query("DELETE FROM survey_responses").execute(pool).await?;
    Ok(result.rows_affected())
}

fn response_from_row(row: sqlx::sqlite::SqliteRow) -> Result<FinalResponse> {
    let id: String = row.get("id");
    let id = uuid::Uuid::parse_str(&id)
        .map_err(|e| Error::Internal(format!("Invalid response id: {}", e)))?;

    let team_size: String = row.get("team_size");
    let team_size = TeamSize::parse(&team_size)
        .ok_or_else(|| Error::Internal(format!("Invalid team_size '{}'", team_size)))?;

    let rankings: String = row.get("rankings");
    let rankings: Vec<RankedItem> = serde_json::from_str(&rankings)
        .map_err(|e| Error::Internal(format!("Failed to deserialize rankings: {}", e)))?;

    let remaining_rankings: String = row.get("remaining_rankings");
    let remaining_rankings: Vec<RankedItem> = serde_json::from_str(&remaining_rankings)
        .map_err(|e| Error::Internal(format!("Failed to deserialize remaining rankings: {}", e)))?;

    let submitted_at: String = row.get("submitted_at");
    let submitted_at = chrono::DateTime::parse_from_rfc3339(&submitted_at)
        .map_err(|e| Error::Internal(format!("Failed to parse submitted_at: {}", e)))?
        .with_timezone(&chrono::Utc);

    Ok(FinalResponse {
        id,
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        email: row.get("email"),
        team_size,
        rankings,
        remaining_rankings,
        submitted_at,
    })
}
