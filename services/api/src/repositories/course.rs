//! Course repository for database operations

use common::error::DatabaseResult;
use scheduling::model::{LifecycleState, Page};
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::info;
use uuid::Uuid;

use super::decode;
use crate::models::course::Course;

const COLUMNS: &str = "id, title, description, bullet_pt1, bullet_pt2, bullet_pt3, duration, \
    package_type, total_price, discounted_price, image_url, image_public_id, state, \
    created_at, updated_at";

fn course_from_row(row: &PgRow) -> DatabaseResult<Course> {
    Ok(Course {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        bullet_pt1: row.get("bullet_pt1"),
        bullet_pt2: row.get("bullet_pt2"),
        bullet_pt3: row.get("bullet_pt3"),
        duration: row.get("duration"),
        package_type: row.get("package_type"),
        total_price: row.get("total_price"),
        discounted_price: row.get("discounted_price"),
        image_url: row.get("image_url"),
        image_public_id: row.get("image_public_id"),
        state: decode(row.get("state"))?,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

/// Course repository
#[derive(Clone)]
pub struct CourseRepository {
    pool: PgPool,
}

impl CourseRepository {
    /// Create a new course repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new course
    pub async fn create(&self, course: &Course) -> DatabaseResult<Course> {
        info!(title = %course.title, "Creating course");

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO courses (title, description, bullet_pt1, bullet_pt2, bullet_pt3,
                                 duration, package_type, total_price, discounted_price,
                                 image_url, image_public_id, state)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(&course.title)
        .bind(&course.description)
        .bind(&course.bullet_pt1)
        .bind(&course.bullet_pt2)
        .bind(&course.bullet_pt3)
        .bind(&course.duration)
        .bind(&course.package_type)
        .bind(course.total_price)
        .bind(course.discounted_price)
        .bind(&course.image_url)
        .bind(&course.image_public_id)
        .bind(course.state.as_str())
        .fetch_one(&self.pool)
        .await?;

        course_from_row(&row)
    }

    /// Get a course by ID
    pub async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<Course>> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM courses WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(course_from_row).transpose()
    }

    /// List courses, newest first
    pub async fn list(
        &self,
        state: Option<LifecycleState>,
        page: Page,
    ) -> DatabaseResult<Vec<Course>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {COLUMNS}
            FROM courses
            WHERE ($1::text IS NULL OR state = $1)
            ORDER BY created_at DESC, id
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(state.map(|s| s.as_str()))
        .bind(page.limit)
        .bind(page.skip)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(course_from_row).collect()
    }

    /// Case-insensitive substring search on the title
    pub async fn search(&self, term: &str, page: Page) -> DatabaseResult<Vec<Course>> {
        let pattern = format!("%{}%", escape_like(term));
        let rows = sqlx::query(&format!(
            r#"
            SELECT {COLUMNS}
            FROM courses
            WHERE title ILIKE $1
            ORDER BY title, id
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(pattern)
        .bind(page.limit)
        .bind(page.skip)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(course_from_row).collect()
    }

    /// Courses whose discounted price lies within `[min_price, max_price]`
    pub async fn by_price_range(
        &self,
        min_price: f64,
        max_price: f64,
    ) -> DatabaseResult<Vec<Course>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {COLUMNS}
            FROM courses
            WHERE discounted_price BETWEEN $1 AND $2
            ORDER BY discounted_price, id
            "#
        ))
        .bind(min_price)
        .bind(max_price)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(course_from_row).collect()
    }

    /// Courses of one package type
    pub async fn by_package_type(&self, package_type: &str) -> DatabaseResult<Vec<Course>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {COLUMNS}
            FROM courses
            WHERE package_type = $1
            ORDER BY created_at DESC, id
            "#
        ))
        .bind(package_type)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(course_from_row).collect()
    }

    /// Persist every editable field of a course
    pub async fn update(&self, course: &Course) -> DatabaseResult<Option<Course>> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE courses
            SET title = $2, description = $3, bullet_pt1 = $4, bullet_pt2 = $5,
                bullet_pt3 = $6, duration = $7, package_type = $8, total_price = $9,
                discounted_price = $10, image_url = $11, image_public_id = $12,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(course.id)
        .bind(&course.title)
        .bind(&course.description)
        .bind(&course.bullet_pt1)
        .bind(&course.bullet_pt2)
        .bind(&course.bullet_pt3)
        .bind(&course.duration)
        .bind(&course.package_type)
        .bind(course.total_price)
        .bind(course.discounted_price)
        .bind(&course.image_url)
        .bind(&course.image_public_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(course_from_row).transpose()
    }

    /// Move a course to another lifecycle state
    pub async fn set_state(
        &self,
        id: Uuid,
        state: LifecycleState,
    ) -> DatabaseResult<Option<Course>> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE courses
            SET state = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id)
        .bind(state.as_str())
        .fetch_optional(&self.pool)
        .await?;

        info!(course_id = %id, %state, "Course state changed");
        row.as_ref().map(course_from_row).transpose()
    }

    /// Remove a course and, through cascades, its sessions and bookings
    pub async fn delete(&self, id: Uuid) -> DatabaseResult<bool> {
        let result = sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Escape `%`, `_` and `\` so user input matches literally inside ILIKE
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
