//! FAQ catalogue repository

use common::error::DatabaseResult;
use scheduling::model::Page;
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::models::faq::{CreateFaqRequest, Faq, FaqCategory};

/// Unique constraint on `faq_categories.title`
pub const CATEGORY_TITLE_CONSTRAINT: &str = "uq_faq_categories_title";

const CATEGORY_COLUMNS: &str = "id, title, created_at, updated_at";
const FAQ_COLUMNS: &str = "id, category_id, question, answer, created_at, updated_at";

fn category_from_row(row: &PgRow) -> FaqCategory {
    FaqCategory {
        id: row.get("id"),
        title: row.get("title"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn faq_from_row(row: &PgRow) -> Faq {
    Faq {
        id: row.get("id"),
        category_id: row.get("category_id"),
        question: row.get("question"),
        answer: row.get("answer"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// Repository for FAQ categories and their questions
#[derive(Clone)]
pub struct FaqRepository {
    pool: PgPool,
}

impl FaqRepository {
    /// Create a new FAQ repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_category(&self, title: &str) -> DatabaseResult<FaqCategory> {
        let row = sqlx::query(&format!(
            "INSERT INTO faq_categories (title) VALUES ($1) RETURNING {CATEGORY_COLUMNS}"
        ))
        .bind(title)
        .fetch_one(&self.pool)
        .await?;

        Ok(category_from_row(&row))
    }

    pub async fn find_category(&self, id: Uuid) -> DatabaseResult<Option<FaqCategory>> {
        let row = sqlx::query(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM faq_categories WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(category_from_row))
    }

    pub async fn category_exists(&self, id: Uuid) -> DatabaseResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM faq_categories WHERE id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    /// List categories, newest first
    pub async fn list_categories(&self, page: Page) -> DatabaseResult<Vec<FaqCategory>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {CATEGORY_COLUMNS}
            FROM faq_categories
            ORDER BY created_at DESC, id
            LIMIT $1 OFFSET $2
            "#
        ))
        .bind(page.limit)
        .bind(page.skip)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(category_from_row).collect())
    }

    pub async fn rename_category(
        &self,
        id: Uuid,
        title: &str,
    ) -> DatabaseResult<Option<FaqCategory>> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE faq_categories
            SET title = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {CATEGORY_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(title)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(category_from_row))
    }

    /// Delete a category together with its questions
    pub async fn delete_category(&self, id: Uuid) -> DatabaseResult<bool> {
        let result = sqlx::query("DELETE FROM faq_categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn create_faq(&self, payload: &CreateFaqRequest) -> DatabaseResult<Faq> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO faqs (category_id, question, answer)
            VALUES ($1, $2, $3)
            RETURNING {FAQ_COLUMNS}
            "#
        ))
        .bind(payload.category_id)
        .bind(&payload.question)
        .bind(&payload.answer)
        .fetch_one(&self.pool)
        .await?;

        Ok(faq_from_row(&row))
    }

    pub async fn find_faq(&self, id: Uuid) -> DatabaseResult<Option<Faq>> {
        let row = sqlx::query(&format!("SELECT {FAQ_COLUMNS} FROM faqs WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(faq_from_row))
    }

    /// List questions, newest first, optionally within one category
    pub async fn list_faqs(
        &self,
        category_id: Option<Uuid>,
        page: Page,
    ) -> DatabaseResult<Vec<Faq>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {FAQ_COLUMNS}
            FROM faqs
            WHERE ($1::uuid IS NULL OR category_id = $1)
            ORDER BY created_at DESC, id
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(category_id)
        .bind(page.limit)
        .bind(page.skip)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(faq_from_row).collect())
    }

    pub async fn update_faq(&self, faq: &Faq) -> DatabaseResult<Option<Faq>> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE faqs
            SET category_id = $2, question = $3, answer = $4, updated_at = NOW()
            WHERE id = $1
            RETURNING {FAQ_COLUMNS}
            "#
        ))
        .bind(faq.id)
        .bind(faq.category_id)
        .bind(&faq.question)
        .bind(&faq.answer)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(faq_from_row))
    }

    pub async fn delete_faq(&self, id: Uuid) -> DatabaseResult<bool> {
        let result = sqlx::query("DELETE FROM faqs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
