use anyhow::Result;
use common::database::{DatabaseConfig, health_check, init_pool};
use common::error::DatabaseError;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use api::config::Settings;
use api::{AppState, MIGRATOR, build_app};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,api=debug,tower_http=info")),
        )
        .init();

    let settings = Settings::load()?;
    info!(
        name = %settings.project.name,
        version = %settings.project.version,
        "Starting API service"
    );

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    if health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    MIGRATOR
        .run(&pool)
        .await
        .map_err(|e| DatabaseError::Migration(e.to_string()))?;
    info!("Database migrations applied");

    let address = settings.bind_address();
    let app = build_app(AppState::new(pool, settings));

    let listener = TcpListener::bind(&address).await?;
    info!("API service listening on {}", address);

    axum::serve(listener, app).await?;

    Ok(())
}
