//! User repository for database operations

use common::error::DatabaseResult;
use scheduling::model::{Page, UserRole};
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::info;
use uuid::Uuid;

use super::decode;
use crate::models::user::{CreateUserRequest, User};

/// Unique constraint on `users.email`
pub const EMAIL_CONSTRAINT: &str = "uq_users_email";

const COLUMNS: &str = "id, email, role, created_at, updated_at";

fn user_from_row(row: &PgRow) -> DatabaseResult<User> {
    Ok(User {
        id: row.get("id"),
        email: row.get("email"),
        role: decode(row.get("role"))?,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

/// User repository
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new user
    pub async fn create(&self, payload: &CreateUserRequest) -> DatabaseResult<User> {
        info!(email = %payload.email, role = %payload.role, "Creating new user");

        let row = sqlx::query(&format!(
            "INSERT INTO users (email, role) VALUES ($1, $2) RETURNING {COLUMNS}"
        ))
        .bind(&payload.email)
        .bind(payload.role.as_str())
        .fetch_one(&self.pool)
        .await?;

        user_from_row(&row)
    }

    /// Find a user by ID
    pub async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<User>> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    /// Find a user by email
    pub async fn find_by_email(&self, email: &str) -> DatabaseResult<Option<User>> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM users WHERE email = $1"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    /// List users, newest first
    pub async fn list(&self, role: Option<UserRole>, page: Page) -> DatabaseResult<Vec<User>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {COLUMNS}
            FROM users
            WHERE ($1::text IS NULL OR role = $1)
            ORDER BY created_at DESC, id
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(role.map(|r| r.as_str()))
        .bind(page.limit)
        .bind(page.skip)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(user_from_row).collect()
    }

    /// Delete a user by ID
    pub async fn delete(&self, id: Uuid) -> DatabaseResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
