//! Class-session repository
//!
//! Writes that need the overlap check go through [`ClassSessionTx`], a
//! transaction that first takes `pg_advisory_xact_lock` on the instructor so
//! concurrent checks for one instructor run one after another.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::error::DatabaseResult;
use scheduling::model::{ClassSession, NewClassSession, Page, SessionFilter};
use scheduling::store::{SessionStore, SessionTx};
use scheduling::{StoreError, StoreResult, TimeWindow};
use sqlx::postgres::{PgExecutor, PgRow};
use sqlx::{PgPool, Postgres, Row, Transaction};
use tracing::debug;
use uuid::Uuid;

use super::{decode, store_error};

const COLUMNS: &str =
    "id, course_id, instructor_id, start_at, duration_minutes, state, created_at, updated_at";

fn session_from_row(row: &PgRow) -> DatabaseResult<ClassSession> {
    Ok(ClassSession {
        id: row.get("id"),
        course_id: row.get("course_id"),
        instructor_id: row.get("instructor_id"),
        start_at: row.get("start_at"),
        duration_minutes: row.get("duration_minutes"),
        state: decode(row.get("state"))?,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

fn optional_session(row: Option<PgRow>) -> StoreResult<Option<ClassSession>> {
    row.as_ref()
        .map(session_from_row)
        .transpose()
        .map_err(store_error)
}

async fn find_by_id<'e, E>(executor: E, id: Uuid) -> StoreResult<Option<ClassSession>>
where
    E: PgExecutor<'e>,
{
    let row = sqlx::query(&format!(
        "SELECT {COLUMNS} FROM class_sessions WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(executor)
    .await
    .map_err(store_error)?;

    optional_session(row)
}

/// Earliest active session of the instructor whose
/// `[start_at, start_at + duration)` overlaps `window`
async fn find_overlapping<'e, E>(
    executor: E,
    instructor_id: Uuid,
    window: TimeWindow,
    exclude: Option<Uuid>,
) -> StoreResult<Option<ClassSession>>
where
    E: PgExecutor<'e>,
{
    let row = sqlx::query(&format!(
        r#"
        SELECT {COLUMNS}
        FROM class_sessions
        WHERE instructor_id = $1
          AND state = 'active'
          AND start_at < $3
          AND start_at + make_interval(mins => duration_minutes) > $2
          AND ($4::uuid IS NULL OR id <> $4)
        ORDER BY start_at
        LIMIT 1
        "#
    ))
    .bind(instructor_id)
    .bind(window.start)
    .bind(window.end)
    .bind(exclude)
    .fetch_optional(executor)
    .await
    .map_err(store_error)?;

    optional_session(row)
}

/// Class-session repository
#[derive(Clone)]
pub struct ClassSessionRepository {
    pool: PgPool,
}

impl ClassSessionRepository {
    /// Create a new class-session repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn delete_where(&self, column: &str, value: Uuid) -> StoreResult<u64> {
        let result = sqlx::query(&format!("DELETE FROM class_sessions WHERE {column} = $1"))
            .bind(value)
            .execute(&self.pool)
            .await
            .map_err(store_error)?;

        Ok(result.rows_affected())
    }
}

#[async_trait]
impl SessionStore for ClassSessionRepository {
    type Tx = ClassSessionTx;

    async fn get(&self, id: Uuid) -> StoreResult<Option<ClassSession>> {
        find_by_id(&self.pool, id).await
    }

    async fn list(&self, filter: &SessionFilter, page: Page) -> StoreResult<Vec<ClassSession>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {COLUMNS}
            FROM class_sessions
            WHERE ($1::uuid IS NULL OR course_id = $1)
              AND ($2::uuid IS NULL OR instructor_id = $2)
              AND ($3::text IS NULL OR state = $3)
            ORDER BY start_at, id
            LIMIT $4 OFFSET $5
            "#
        ))
        .bind(filter.course_id)
        .bind(filter.instructor_id)
        .bind(filter.state.map(|s| s.as_str()))
        .bind(page.limit)
        .bind(page.skip)
        .fetch_all(&self.pool)
        .await
        .map_err(store_error)?;

        rows.iter()
            .map(session_from_row)
            .collect::<DatabaseResult<_>>()
            .map_err(store_error)
    }

    async fn starting_between(
        &self,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> StoreResult<Vec<ClassSession>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {COLUMNS}
            FROM class_sessions
            WHERE state = 'active' AND start_at BETWEEN $1 AND $2
            ORDER BY start_at, id
            "#
        ))
        .bind(from)
        .bind(until)
        .fetch_all(&self.pool)
        .await
        .map_err(store_error)?;

        rows.iter()
            .map(session_from_row)
            .collect::<DatabaseResult<_>>()
            .map_err(store_error)
    }

    async fn find_overlapping(
        &self,
        instructor_id: Uuid,
        window: TimeWindow,
        exclude: Option<Uuid>,
    ) -> StoreResult<Option<ClassSession>> {
        find_overlapping(&self.pool, instructor_id, window, exclude).await
    }

    async fn lock_instructor(&self, instructor_id: Uuid) -> StoreResult<ClassSessionTx> {
        let mut tx = self.pool.begin().await.map_err(store_error)?;

        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
            .bind(instructor_id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(store_error)?;

        debug!(%instructor_id, "Instructor schedule locked");
        Ok(ClassSessionTx { tx })
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        Ok(self.delete_where("id", id).await? > 0)
    }

    async fn delete_by_course(&self, course_id: Uuid) -> StoreResult<u64> {
        self.delete_where("course_id", course_id).await
    }

    async fn delete_by_instructor(&self, instructor_id: Uuid) -> StoreResult<u64> {
        self.delete_where("instructor_id", instructor_id).await
    }
}

/// Transaction holding an instructor's advisory lock
///
/// Dropping it without committing rolls back and releases the lock.
pub struct ClassSessionTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl SessionTx for ClassSessionTx {
    async fn get(&mut self, id: Uuid) -> StoreResult<Option<ClassSession>> {
        find_by_id(&mut *self.tx, id).await
    }

    async fn find_overlapping(
        &mut self,
        instructor_id: Uuid,
        window: TimeWindow,
        exclude: Option<Uuid>,
    ) -> StoreResult<Option<ClassSession>> {
        find_overlapping(&mut *self.tx, instructor_id, window, exclude).await
    }

    async fn insert(&mut self, session: &NewClassSession) -> StoreResult<ClassSession> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO class_sessions (course_id, instructor_id, start_at, duration_minutes, state)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(session.course_id)
        .bind(session.instructor_id)
        .bind(session.start_at)
        .bind(session.duration_minutes)
        .bind(session.state.as_str())
        .fetch_one(&mut *self.tx)
        .await
        .map_err(store_error)?;

        session_from_row(&row).map_err(store_error)
    }

    async fn save(&mut self, session: &ClassSession) -> StoreResult<ClassSession> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE class_sessions
            SET start_at = $2, duration_minutes = $3, state = $4, updated_at = NOW()
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(session.id)
        .bind(session.start_at)
        .bind(session.duration_minutes)
        .bind(session.state.as_str())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(store_error)?;

        optional_session(row)?.ok_or_else(|| {
            StoreError::Backend(anyhow::anyhow!(
                "class session {} vanished while locked",
                session.id
            ))
        })
    }

    async fn commit(self) -> StoreResult<()> {
        self.tx.commit().await.map_err(store_error)
    }
}
