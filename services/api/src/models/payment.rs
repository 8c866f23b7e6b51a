//! Payment models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::text_enum;

pub const MAX_PAYMENT_METHOD_LEN: usize = 50;
pub const MAX_TRANSACTION_ID_LEN: usize = 100;

/// Payment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Completed,
    Failed,
    Refunded,
}

text_enum!(PaymentStatus, "payment status", {
    Pending => "pending",
    Completed => "completed",
    Failed => "failed",
    Refunded => "refunded",
});

/// A payment made by a student for a course
#[derive(Debug, Clone, Serialize)]
pub struct Payment {
    pub id: Uuid,
    pub student_id: Uuid,
    pub course_id: Uuid,
    pub amount: f64,
    pub status: PaymentStatus,
    pub payment_method: String,
    /// Reference issued by the payment gateway
    pub transaction_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request for recording a payment
#[derive(Debug, Deserialize)]
pub struct CreatePaymentRequest {
    pub student_id: Uuid,
    pub course_id: Uuid,
    pub amount: f64,
    #[serde(default)]
    pub status: PaymentStatus,
    pub payment_method: String,
    pub transaction_id: Option<String>,
}

/// Partial update of a payment
#[derive(Debug, Default, Deserialize)]
pub struct UpdatePaymentRequest {
    pub status: Option<PaymentStatus>,
    pub transaction_id: Option<String>,
}

/// Request for moving a payment to another status
#[derive(Debug, Deserialize)]
pub struct PaymentStatusRequest {
    pub status: PaymentStatus,
}

/// Filters for listing payments
#[derive(Debug, Default, Deserialize)]
pub struct PaymentQuery {
    pub student_id: Option<Uuid>,
    pub course_id: Option<Uuid>,
    pub status: Option<PaymentStatus>,
}
