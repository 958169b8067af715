//! Database initialization
//!
//! Creates the SQLite database on first run and ensures the schema and
//! default settings exist. All statements are idempotent; calling
//! `init_database` against an existing database is safe.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::{info, warn};

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // Enable foreign keys
    sqlx::query("PRAGMA foreign_keys = ON").execute(&pool).await?;

    // WAL mode: concurrent readers with one writer. Results aggregation
    // reads while sessions submit.
    sqlx::query("PRAGMA journal_mode = WAL").execute(&pool).await?;

    sqlx::query("PRAGMA busy_timeout = 5000").execute(&pool).await?;

    create_settings_table(&pool).await?;
    create_survey_responses_table(&pool).await?;
    create_survey_drafts_table(&pool).await?;

    init_default_settings(&pool).await?;

    Ok(pool)
}

/// Create the settings table
///
/// Stores application configuration key-value pairs.
pub async fn create_settings_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY,
            value TEXT,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the survey_responses table
///
/// One immutable row per final submission. The UNIQUE index on `email` is
/// the authoritative duplicate-identity guard: the application pre-checks
/// for an existing email, but concurrent submitters racing past that check
/// are resolved here by the constraint.
pub async fn create_survey_responses_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS survey_responses (
            id TEXT PRIMARY KEY,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            email TEXT NOT NULL,
            team_size TEXT NOT NULL CHECK (team_size IN ('1-2', '3-20', '20+')),
            rankings TEXT NOT NULL,
            remaining_rankings TEXT NOT NULL,
            submitted_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Emails are stored lower-case, so this index is case-insensitive in effect
    sqlx::query(
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_survey_responses_email ON survey_responses(email)",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_survey_responses_submitted_at ON survey_responses(submitted_at)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the survey_drafts table
///
/// One row per in-flight session, upserted wholesale on step transitions
/// and deleted when the session finalizes.
pub async fn create_survey_drafts_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS survey_drafts (
            session_id TEXT PRIMARY KEY,
            step TEXT NOT NULL CHECK (step IN ('selecting', 'ranking', 'contact', 'done', 'already_submitted', 'failed')),
            selections TEXT,
            rankings TEXT,
            remaining_rankings TEXT,
            first_name TEXT,
            last_name TEXT,
            email TEXT,
            team_size TEXT CHECK (team_size IS NULL OR team_size IN ('1-2', '3-20', '20+')),
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_survey_drafts_updated_at ON survey_drafts(updated_at)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Initialize or update default settings
///
/// Ensures the gate secrets exist as settings rows (empty value means
/// unconfigured; verification against an empty secret always fails).
async fn init_default_settings(pool: &SqlitePool) -> Result<()> {
    ensure_setting(pool, "results_password", "").await?;
    ensure_setting(pool, "admin_password", "").await?;
    ensure_setting(pool, "admin_email", "").await?;

    info!("Default settings initialized");
    Ok(())
}

/// Ensure a setting exists with the specified default value
///
/// If the setting doesn't exist, it will be created with the default.
/// If the setting exists but has a NULL value, it will be reset to the default.
pub async fn ensure_setting(pool: &SqlitePool, key: &str, default_value: &str) -> Result<()> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM settings WHERE key = ?)")
        .bind(key)
        .fetch_one(pool)
        .await?;

    if !exists {
        // INSERT OR IGNORE handles concurrent initialization races: multiple
        // connections may pass the exists check simultaneously
        sqlx::query("INSERT OR IGNORE INTO settings (key, value) VALUES (?, ?)")
            .bind(key)
            .bind(default_value)
            .execute(pool)
            .await?;

        return Ok(());
    }

    let value: Option<String> = sqlx::query_scalar("SELECT value FROM settings WHERE key = ?")
        .bind(key)
        .fetch_one(pool)
        .await?;

    if value.is_none() {
        sqlx::query("UPDATE settings SET value = ? WHERE key = ?")
            .bind(default_value)
            .bind(key)
            .execute(pool)
            .await?;

        warn!("Setting '{}' was NULL, reset to default", key);
    }

    Ok(())
}
