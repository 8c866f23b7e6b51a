//! Review models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const MAX_REVIEWER_NAME_LEN: usize = 100;
pub const MAX_COURSE_TITLE_LEN: usize = 200;

/// A review left by a learner
#[derive(Debug, Clone, Serialize)]
pub struct Review {
    pub id: Uuid,
    pub reviewer_name: String,
    pub email: String,
    /// 1 to 5 stars
    pub rating: i32,
    pub comment: Option<String>,
    pub course_title: Option<String>,
    pub approved: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request for leaving a review
#[derive(Debug, Deserialize)]
pub struct CreateReviewRequest {
    pub reviewer_name: String,
    pub email: String,
    pub rating: i32,
    pub comment: Option<String>,
    pub course_title: Option<String>,
    #[serde(default)]
    pub approved: bool,
}

/// Partial update of a review
#[derive(Debug, Default, Deserialize)]
pub struct UpdateReviewRequest {
    pub reviewer_name: Option<String>,
    pub rating: Option<i32>,
    pub comment: Option<String>,
    pub course_title: Option<String>,
    pub approved: Option<bool>,
}

impl UpdateReviewRequest {
    pub fn apply_to(self, review: &mut Review) {
        if let Some(name) = self.reviewer_name {
            review.reviewer_name = name;
        }
        if let Some(rating) = self.rating {
            review.rating = rating;
        }
        if self.comment.is_some() {
            review.comment = self.comment;
        }
        if self.course_title.is_some() {
            review.course_title = self.course_title;
        }
        if let Some(approved) = self.approved {
            review.approved = approved;
        }
    }
}
