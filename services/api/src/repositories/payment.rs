//! Payment repository for database operations

use common::error::DatabaseResult;
use scheduling::model::Page;
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::info;
use uuid::Uuid;

use super::decode;
use crate::models::payment::{CreatePaymentRequest, Payment, PaymentQuery, PaymentStatus};

/// Unique constraint on `payments.transaction_id`
pub const TRANSACTION_ID_CONSTRAINT: &str = "uq_payments_transaction_id";

const COLUMNS: &str = "id, student_id, course_id, amount, status, payment_method, \
    transaction_id, created_at, updated_at";

fn payment_from_row(row: &PgRow) -> DatabaseResult<Payment> {
    Ok(Payment {
        id: row.get("id"),
        student_id: row.get("student_id"),
        course_id: row.get("course_id"),
        amount: row.get("amount"),
        status: decode(row.get("status"))?,
        payment_method: row.get("payment_method"),
        transaction_id: row.get("transaction_id"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

/// Payment repository
#[derive(Clone)]
pub struct PaymentRepository {
    pool: PgPool,
}

impl PaymentRepository {
    /// Create a new payment repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Record a payment
    pub async fn create(&self, payload: &CreatePaymentRequest) -> DatabaseResult<Payment> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO payments (student_id, course_id, amount, status, payment_method, transaction_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(payload.student_id)
        .bind(payload.course_id)
        .bind(payload.amount)
        .bind(payload.status.as_str())
        .bind(&payload.payment_method)
        .bind(&payload.transaction_id)
        .fetch_one(&self.pool)
        .await?;

        let payment = payment_from_row(&row)?;
        info!(payment_id = %payment.id, student_id = %payment.student_id, "Payment recorded");
        Ok(payment)
    }

    /// Get a payment by ID
    pub async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<Payment>> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM payments WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(payment_from_row).transpose()
    }

    /// Whether another payment already carries `transaction_id`
    pub async fn transaction_id_taken(
        &self,
        transaction_id: &str,
        exclude: Option<Uuid>,
    ) -> DatabaseResult<bool> {
        let taken: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM payments
                WHERE transaction_id = $1 AND ($2::uuid IS NULL OR id <> $2)
            )
            "#,
        )
        .bind(transaction_id)
        .bind(exclude)
        .fetch_one(&self.pool)
        .await?;

        Ok(taken)
    }

    /// List payments, newest first
    pub async fn list(&self, query: &PaymentQuery, page: Page) -> DatabaseResult<Vec<Payment>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {COLUMNS}
            FROM payments
            WHERE ($1::uuid IS NULL OR student_id = $1)
              AND ($2::uuid IS NULL OR course_id = $2)
              AND ($3::text IS NULL OR status = $3)
            ORDER BY created_at DESC, id
            LIMIT $4 OFFSET $5
            "#
        ))
        .bind(query.student_id)
        .bind(query.course_id)
        .bind(query.status.map(|s| s.as_str()))
        .bind(page.limit)
        .bind(page.skip)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(payment_from_row).collect()
    }

    /// Persist status and transaction id
    pub async fn update(
        &self,
        id: Uuid,
        status: PaymentStatus,
        transaction_id: Option<&str>,
    ) -> DatabaseResult<Option<Payment>> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE payments
            SET status = $2, transaction_id = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id)
        .bind(status.as_str())
        .bind(transaction_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(payment_from_row).transpose()
    }

    /// Delete a payment by ID
    pub async fn delete(&self, id: Uuid) -> DatabaseResult<bool> {
        let result = sqlx::query("DELETE FROM payments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete every payment of a student
    pub async fn delete_by_student(&self, student_id: Uuid) -> DatabaseResult<u64> {
        let result = sqlx::query("DELETE FROM payments WHERE student_id = $1")
            .bind(student_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Delete every payment for a course
    pub async fn delete_by_course(&self, course_id: Uuid) -> DatabaseResult<u64> {
        let result = sqlx::query("DELETE FROM payments WHERE course_id = $1")
            .bind(course_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
