//! rankpoll-web - Ranked-priority survey service
//!
//! Collects ranked priorities from respondents, persists in-progress
//! drafts for resumability, enforces one final response per email, and
//! serves a password-gated aggregated leaderboard.

use anyhow::Result;
use clap::Parser;
use tracing::info;

use rankpoll_common::config::{RootFolderInitializer, RootFolderResolver, TomlConfig};
use rankpoll_web::catalog::SurveyConfig;
use rankpoll_web::{build_router, AppState};

const DEFAULT_PORT: u16 = 5730;

#[derive(Debug, Parser)]
#[command(name = "rankpoll-web", version, about = "Ranked-priority survey service")]
struct Args {
    /// Root folder holding the database (overrides ENV and TOML)
    #[arg(long)]
    root_folder: Option<String>,

    /// Listen port (overrides TOML)
    #[arg(long, env = "RANKPOLL_PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Log build identification immediately after tracing init, before any
    // database delays
    info!(
        "Starting rankpoll-web v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let toml_config = TomlConfig::load();

    // Resolve root folder: CLI arg → ENV → TOML → compiled default
    let resolver = RootFolderResolver::new(args.root_folder.as_deref(), &toml_config);
    let root_folder = resolver.resolve();

    let initializer = RootFolderInitializer::new(root_folder);
    initializer.ensure_directory_exists()?;

    let db_path = initializer.database_path();
    info!("Database path: {}", db_path.display());

    let pool = rankpoll_common::db::init::init_database(&db_path).await?;

    // Catalog and K: compiled-in defaults unless the TOML [survey] section
    // replaces them
    let survey = SurveyConfig::from_toml_section(toml_config.survey.as_ref())?;
    info!(
        items = survey.items().len(),
        max_selections = survey.max_selections(),
        "Survey catalog loaded"
    );

    let secrets = rankpoll_web::config::resolve_gate_secrets(&pool, &toml_config).await?;

    let state = AppState::new(pool, survey, secrets);
    let app = build_router(state);

    let port = args
        .port
        .or(toml_config.listen_port)
        .unwrap_or(DEFAULT_PORT);
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
    info!("rankpoll-web listening on http://127.0.0.1:{}", port);
    info!("Health check: http://127.0.0.1:{}/health", port);

    axum::serve(listener, app).await?;

    Ok(())
}
