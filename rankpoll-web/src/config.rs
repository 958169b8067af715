//! Gate secret resolution
//!
//! Multi-tier resolution with Database → ENV → TOML priority. The
//! database settings row is authoritative so operators can rotate secrets
//! without redeploying.

use rankpoll_common::config::TomlConfig;
use rankpoll_common::db::settings::get_setting;
use rankpoll_common::Result;
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::auth::GateSecrets;

/// Resolve one secret from the three configuration tiers
pub async fn resolve_secret(
    db: &SqlitePool,
    key: &str,
    env_var: &str,
    toml_value: Option<&str>,
) -> Result<Option<String>> {
    let mut sources = Vec::new();

    let db_value = get_setting(db, key).await?.filter(|v| !v.trim().is_empty());
    if db_value.is_some() {
        sources.push("database");
    }

    let env_value = std::env::var(env_var).ok().filter(|v| !v.trim().is_empty());
    if env_value.is_some() {
        sources.push("environment");
    }

    let toml_config_value = toml_value.filter(|v| !v.trim().is_empty());
    if toml_config_value.is_some() {
        sources.push("TOML");
    }

    if sources.len() > 1 {
        warn!(
            "Secret '{}' found in multiple sources: {}. Using {} (highest priority).",
            key,
            sources.join(", "),
            sources[0]
        );
    }

    if let Some(value) = db_value {
        info!("Secret '{}' loaded from database", key);
        return Ok(Some(value));
    }
    if let Some(value) = env_value {
        info!("Secret '{}' loaded from environment variable {}", key, env_var);
        return Ok(Some(value));
    }
    if let Some(value) = toml_config_value {
        info!("Secret '{}' loaded from TOML config", key);
        return Ok(Some(value.to_string()));
    }

    Ok(None)
}

/// Resolve all gate secrets, warning for each one left unconfigured
pub async fn resolve_gate_secrets(
    db: &SqlitePool,
    toml_config: &TomlConfig,
) -> Result<GateSecrets> {
    let results_password = resolve_secret(
        db,
        "results_password",
        "RANKPOLL_RESULTS_PASSWORD",
        toml_config.results_password.as_deref(),
    )
    .await?;
    let admin_password = resolve_secret(
        db,
        "admin_password",
        "RANKPOLL_ADMIN_PASSWORD",
        toml_config.admin_password.as_deref(),
    )
    .await?;
    let admin_email = resolve_secret(
        db,
        "admin_email",
        "RANKPOLL_ADMIN_EMAIL",
        toml_config.admin_email.as_deref(),
    )
    .await?;

    if results_password.is_none() {
        warn!("results_password is not configured; the results page will refuse all access");
    }
    if admin_password.is_none() {
        warn!("admin_password is not configured; admin operations will refuse all access");
    }

    Ok(GateSecrets {
        results_password,
        admin_password,
        admin_email,
    })
}
