//! Review repository for database operations

use common::error::DatabaseResult;
use scheduling::model::Page;
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::models::review::{CreateReviewRequest, Review};

const COLUMNS: &str =
    "id, reviewer_name, email, rating, comment, course_title, approved, created_at, updated_at";

fn review_from_row(row: &PgRow) -> Review {
    Review {
        id: row.get("id"),
        reviewer_name: row.get("reviewer_name"),
        email: row.get("email"),
        rating: row.get("rating"),
        comment: row.get("comment"),
        course_title: row.get("course_title"),
        approved: row.get("approved"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// Review repository
#[derive(Clone)]
pub struct ReviewRepository {
    pool: PgPool,
}

impl ReviewRepository {
    /// Create a new review repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new review
    pub async fn create(&self, payload: &CreateReviewRequest) -> DatabaseResult<Review> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO reviews (reviewer_name, email, rating, comment, course_title, approved)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(&payload.reviewer_name)
        .bind(&payload.email)
        .bind(payload.rating)
        .bind(&payload.comment)
        .bind(&payload.course_title)
        .bind(payload.approved)
        .fetch_one(&self.pool)
        .await?;

        Ok(review_from_row(&row))
    }

    /// Get a review by ID
    pub async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<Review>> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM reviews WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(review_from_row))
    }

    /// List reviews, newest first
    ///
    /// `approved_only` hides reviews awaiting moderation; `course_title`
    /// restricts to reviews of one course.
    pub async fn list(
        &self,
        approved_only: bool,
        course_title: Option<&str>,
        page: Page,
    ) -> DatabaseResult<Vec<Review>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {COLUMNS}
            FROM reviews
            WHERE (NOT $1 OR approved)
              AND ($2::text IS NULL OR course_title = $2)
            ORDER BY created_at DESC, id
            LIMIT $3 OFFSET $4
            "#
        ))
        .bind(approved_only)
        .bind(course_title)
        .bind(page.limit)
        .bind(page.skip)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(review_from_row).collect())
    }

    /// Persist the editable fields of a review
    pub async fn update(&self, review: &Review) -> DatabaseResult<Option<Review>> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE reviews
            SET reviewer_name = $2, rating = $3, comment = $4, course_title = $5,
                approved = $6, updated_at = NOW()
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(review.id)
        .bind(&review.reviewer_name)
        .bind(review.rating)
        .bind(&review.comment)
        .bind(&review.course_title)
        .bind(review.approved)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(review_from_row))
    }

    /// Delete a review by ID
    pub async fn delete(&self, id: Uuid) -> DatabaseResult<bool> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
