//! User and course lookups for the scheduling services

use async_trait::async_trait;
use scheduling::StoreResult;
use scheduling::model::{LifecycleState, UserRole};
use scheduling::store::Directory;
use sqlx::PgPool;
use uuid::Uuid;

use super::{decode, store_error};

/// Directory backed by the `users` and `courses` tables
#[derive(Clone)]
pub struct DirectoryRepository {
    pool: PgPool,
}

impl DirectoryRepository {
    /// Create a new directory repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Directory for DirectoryRepository {
    async fn user_role(&self, user_id: Uuid) -> StoreResult<Option<UserRole>> {
        let role: Option<String> = sqlx::query_scalar("SELECT role FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_error)?;

        role.map(decode).transpose().map_err(store_error)
    }

    async fn course_state(&self, course_id: Uuid) -> StoreResult<Option<LifecycleState>> {
        let state: Option<String> = sqlx::query_scalar("SELECT state FROM courses WHERE id = $1")
            .bind(course_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_error)?;

        state.map(decode).transpose().map_err(store_error)
    }
}
