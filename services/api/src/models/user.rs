//! User models

use chrono::{DateTime, Utc};
use scheduling::model::UserRole;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered user
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request for user registration
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub role: UserRole,
}

/// Filters for listing users
#[derive(Debug, Default, Deserialize)]
pub struct UserQuery {
    pub role: Option<UserRole>,
}
