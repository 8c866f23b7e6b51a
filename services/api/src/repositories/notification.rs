//! Device-token and notification-log repository

use common::error::DatabaseResult;
use scheduling::model::{Page, UserRole};
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use super::decode;
use crate::models::notification::{DeliveryAttempt, DeviceToken, NotificationLog, PushMessage};

const TOKEN_COLUMNS: &str =
    "id, user_id, user_role, token, device_info, active, created_at, updated_at";
const LOG_COLUMNS: &str =
    "id, user_id, user_role, title, body, data, token, success, error_message, sent_at";

fn token_from_row(row: &PgRow) -> DatabaseResult<DeviceToken> {
    Ok(DeviceToken {
        id: row.get("id"),
        user_id: row.get("user_id"),
        user_role: decode(row.get("user_role"))?,
        token: row.get("token"),
        device_info: row.get("device_info"),
        active: row.get("active"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

fn log_from_row(row: &PgRow) -> DatabaseResult<NotificationLog> {
    Ok(NotificationLog {
        id: row.get("id"),
        user_id: row.get("user_id"),
        user_role: decode(row.get("user_role"))?,
        title: row.get("title"),
        body: row.get("body"),
        data: row.get("data"),
        token: row.get("token"),
        success: row.get("success"),
        error_message: row.get("error_message"),
        sent_at: row.get("sent_at"),
    })
}

/// Notification repository
#[derive(Clone)]
pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    /// Create a new notification repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Register a device token, re-activating and re-assigning it if known
    pub async fn upsert_token(
        &self,
        user_id: Uuid,
        user_role: UserRole,
        token: &str,
        device_info: Option<&str>,
    ) -> DatabaseResult<DeviceToken> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO device_tokens (user_id, user_role, token, device_info)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT ON CONSTRAINT uq_device_tokens_token DO UPDATE
            SET user_id = EXCLUDED.user_id,
                user_role = EXCLUDED.user_role,
                device_info = EXCLUDED.device_info,
                active = TRUE,
                updated_at = NOW()
            RETURNING {TOKEN_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(user_role.as_str())
        .bind(token)
        .bind(device_info)
        .fetch_one(&self.pool)
        .await?;

        token_from_row(&row)
    }

    /// Stop delivering to a token; returns false when it is unknown
    pub async fn deactivate_token(&self, token: &str) -> DatabaseResult<bool> {
        let result = sqlx::query(
            "UPDATE device_tokens SET active = FALSE, updated_at = NOW() WHERE token = $1",
        )
        .bind(token)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn active_tokens_for_user(&self, user_id: Uuid) -> DatabaseResult<Vec<DeviceToken>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {TOKEN_COLUMNS}
            FROM device_tokens
            WHERE user_id = $1 AND active
            ORDER BY created_at, id
            "#
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(token_from_row).collect()
    }

    pub async fn active_tokens_for_role(&self, role: UserRole) -> DatabaseResult<Vec<DeviceToken>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {TOKEN_COLUMNS}
            FROM device_tokens
            WHERE user_role = $1 AND active
            ORDER BY created_at, id
            "#
        ))
        .bind(role.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(token_from_row).collect()
    }

    /// Append one delivery attempt to the log
    pub async fn record(
        &self,
        attempt: &DeliveryAttempt,
        message: &PushMessage,
    ) -> DatabaseResult<()> {
        sqlx::query(
            r#"
            INSERT INTO notification_logs (user_id, user_role, title, body, data, token,
                                           success, error_message)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(attempt.user_id)
        .bind(attempt.user_role.as_str())
        .bind(&message.title)
        .bind(&message.body)
        .bind(&message.data)
        .bind(&attempt.token)
        .bind(attempt.succeeded())
        .bind(&attempt.error)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Delivery history of a user, most recent first
    pub async fn logs_for_user(
        &self,
        user_id: Uuid,
        page: Page,
    ) -> DatabaseResult<Vec<NotificationLog>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {LOG_COLUMNS}
            FROM notification_logs
            WHERE user_id = $1
            ORDER BY sent_at DESC, id
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(user_id)
        .bind(page.limit)
        .bind(page.skip)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(log_from_row).collect()
    }
}
