//! Booking repository
//!
//! `uq_bookings_student_session` backs the one-booking-per-pair rule; a
//! violation surfaces as `StoreError::UniqueViolation` carrying that name.

use async_trait::async_trait;
use common::error::DatabaseResult;
use scheduling::model::{Booking, BookingFilter, NewBooking, Page};
use scheduling::store::BookingStore;
use scheduling::{StoreError, StoreResult};
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use super::{decode, store_error};

const COLUMNS: &str = "id, student_id, class_session_id, phone_no, suburb, message, status, \
    remarks, created_at, updated_at";

fn booking_from_row(row: &PgRow) -> DatabaseResult<Booking> {
    Ok(Booking {
        id: row.get("id"),
        student_id: row.get("student_id"),
        class_session_id: row.get("class_session_id"),
        phone_no: row.get("phone_no"),
        suburb: row.get("suburb"),
        message: row.get("message"),
        status: decode(row.get("status"))?,
        remarks: row.get("remarks"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

fn optional_booking(row: Option<PgRow>) -> StoreResult<Option<Booking>> {
    row.as_ref()
        .map(booking_from_row)
        .transpose()
        .map_err(store_error)
}

/// Booking repository
#[derive(Clone)]
pub struct BookingRepository {
    pool: PgPool,
}

impl BookingRepository {
    /// Create a new booking repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookingStore for BookingRepository {
    async fn get(&self, id: Uuid) -> StoreResult<Option<Booking>> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM bookings WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_error)?;

        optional_booking(row)
    }

    async fn find_by_pair(
        &self,
        student_id: Uuid,
        class_session_id: Uuid,
    ) -> StoreResult<Option<Booking>> {
        let row = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM bookings WHERE student_id = $1 AND class_session_id = $2"
        ))
        .bind(student_id)
        .bind(class_session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        optional_booking(row)
    }

    async fn list(&self, filter: &BookingFilter, page: Page) -> StoreResult<Vec<Booking>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {COLUMNS}
            FROM bookings
            WHERE ($1::uuid IS NULL OR student_id = $1)
              AND ($2::uuid IS NULL OR class_session_id = $2)
              AND ($3::text IS NULL OR status = $3)
            ORDER BY created_at DESC, id
            LIMIT $4 OFFSET $5
            "#
        ))
        .bind(filter.student_id)
        .bind(filter.class_session_id)
        .bind(filter.status.map(|s| s.as_str()))
        .bind(page.limit)
        .bind(page.skip)
        .fetch_all(&self.pool)
        .await
        .map_err(store_error)?;

        rows.iter()
            .map(booking_from_row)
            .collect::<DatabaseResult<_>>()
            .map_err(store_error)
    }

    async fn insert(&self, booking: &NewBooking) -> StoreResult<Booking> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO bookings (student_id, class_session_id, phone_no, suburb, message, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(booking.student_id)
        .bind(booking.class_session_id)
        .bind(&booking.details.phone_no)
        .bind(&booking.details.suburb)
        .bind(&booking.details.message)
        .bind(booking.status.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(store_error)?;

        booking_from_row(&row).map_err(store_error)
    }

    async fn save(&self, booking: &Booking) -> StoreResult<Booking> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE bookings
            SET phone_no = $2, suburb = $3, message = $4, status = $5, remarks = $6,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(booking.id)
        .bind(&booking.phone_no)
        .bind(&booking.suburb)
        .bind(&booking.message)
        .bind(booking.status.as_str())
        .bind(&booking.remarks)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        optional_booking(row)?.ok_or_else(|| {
            StoreError::Backend(anyhow::anyhow!("booking {} no longer exists", booking.id))
        })
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM bookings WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(store_error)?;

        Ok(result.rows_affected() > 0)
    }
}
