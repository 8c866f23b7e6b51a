//! FAQ catalogue models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const MAX_CATEGORY_TITLE_LEN: usize = 100;
pub const MAX_QUESTION_LEN: usize = 500;

/// A group of related questions
#[derive(Debug, Clone, Serialize)]
pub struct FaqCategory {
    pub id: Uuid,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request for creating or renaming a category
#[derive(Debug, Deserialize)]
pub struct FaqCategoryRequest {
    pub title: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Faq {
    pub id: Uuid,
    pub category_id: Uuid,
    pub question: String,
    pub answer: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateFaqRequest {
    pub category_id: Uuid,
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateFaqRequest {
    pub category_id: Option<Uuid>,
    pub question: Option<String>,
    pub answer: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FaqQuery {
    pub category_id: Option<Uuid>,
}
