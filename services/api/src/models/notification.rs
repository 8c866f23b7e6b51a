//! Push-notification models

use chrono::{DateTime, Utc};
use scheduling::model::UserRole;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A device registered to receive pushes
#[derive(Debug, Clone, Serialize)]
pub struct DeviceToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub user_role: UserRole,
    pub token: String,
    pub device_info: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request for registering a device token
#[derive(Debug, Deserialize)]
pub struct RegisterTokenRequest {
    pub user_id: Uuid,
    pub token: String,
    pub device_info: Option<String>,
}

/// Content of a push
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushMessage {
    pub title: String,
    pub body: String,
    pub data: Option<serde_json::Value>,
}

/// Request for notifying a single user
#[derive(Debug, Deserialize)]
pub struct SendToUserRequest {
    pub user_id: Uuid,
    #[serde(flatten)]
    pub message: PushMessage,
}

/// Request for notifying every user holding a role
#[derive(Debug, Deserialize)]
pub struct SendToRoleRequest {
    pub role: UserRole,
    #[serde(flatten)]
    pub message: PushMessage,
}

/// Outcome of one delivery attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryAttempt {
    pub user_id: Uuid,
    pub user_role: UserRole,
    pub token: String,
    pub error: Option<String>,
}

impl DeliveryAttempt {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Summary returned after a send
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeliveryReport {
    pub attempted: usize,
    pub delivered: usize,
}

impl DeliveryReport {
    pub fn from_attempts(attempts: &[DeliveryAttempt]) -> Self {
        Self {
            attempted: attempts.len(),
            delivered: attempts.iter().filter(|a| a.succeeded()).count(),
        }
    }
}

/// Audit record of a delivery attempt
#[derive(Debug, Clone, Serialize)]
pub struct NotificationLog {
    pub id: Uuid,
    pub user_id: Uuid,
    pub user_role: UserRole,
    pub title: String,
    pub body: String,
    pub data: Option<serde_json::Value>,
    pub token: String,
    pub success: bool,
    pub error_message: Option<String>,
    pub sent_at: DateTime<Utc>,
}
