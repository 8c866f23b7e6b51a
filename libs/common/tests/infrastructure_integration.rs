//! Integration tests for the infrastructure components
//!
//! These tests verify that the PostgreSQL database is properly configured
//! and accessible. They need a live server reachable through `DATABASE_URL`,
//! so they only run with `cargo test -- --ignored`.

use common::database::{DatabaseConfig, health_check, init_pool};
use sqlx::Row;

/// Verifies PostgreSQL is reachable and can answer a query
#[tokio::test]
#[ignore = "requires a running PostgreSQL reachable through DATABASE_URL"]
async fn test_infrastructure_integration() -> Result<(), Box<dyn std::error::Error>> {
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    assert!(health_check(&pool).await?, "Database health check failed");

    let row = sqlx::query("SELECT 1 as result").fetch_one(&pool).await?;
    let result: i32 = row.get("result");
    assert_eq!(result, 1, "PostgreSQL simple query test failed");

    Ok(())
}

/// The overlap query relies on minute-based interval arithmetic
#[tokio::test]
#[ignore = "requires a running PostgreSQL reachable through DATABASE_URL"]
async fn test_minute_interval_arithmetic() -> Result<(), Box<dyn std::error::Error>> {
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    let row = sqlx::query(
        "SELECT (TIMESTAMPTZ '2030-01-01 10:00:00+00' + make_interval(mins => 90))::text AS ends",
    )
    .fetch_one(&pool)
    .await?;

    let ends: String = row.get("ends");
    assert!(ends.starts_with("2030-01-01 11:30:00"), "got {}", ends);

    Ok(())
}
