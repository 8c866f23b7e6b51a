//! Course catalogue models

use chrono::{DateTime, Utc};
use scheduling::model::LifecycleState;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::validation::{validate_max_len, validate_prices, validate_required};

pub const MAX_TITLE_LEN: usize = 50;
pub const MAX_BULLET_LEN: usize = 80;
pub const MAX_DURATION_LEN: usize = 25;
pub const MAX_PACKAGE_TYPE_LEN: usize = 20;
pub const MAX_IMAGE_URL_LEN: usize = 500;
pub const MAX_IMAGE_ID_LEN: usize = 100;

/// A course offered by the school
#[derive(Debug, Clone, Serialize)]
pub struct Course {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub bullet_pt1: String,
    pub bullet_pt2: String,
    pub bullet_pt3: String,
    /// Free-form label such as "6 weeks"
    pub duration: String,
    pub package_type: String,
    pub total_price: f64,
    pub discounted_price: Option<f64>,
    pub image_url: Option<String>,
    pub image_public_id: Option<String>,
    pub state: LifecycleState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Course {
    /// Check every field limit on the course as it would be stored
    pub fn validate(&self) -> Result<(), String> {
        validate_required("Title", &self.title, MAX_TITLE_LEN)?;
        validate_required("Description", &self.description, usize::MAX)?;
        validate_required("Bullet point 1", &self.bullet_pt1, MAX_BULLET_LEN)?;
        validate_required("Bullet point 2", &self.bullet_pt2, MAX_BULLET_LEN)?;
        validate_required("Bullet point 3", &self.bullet_pt3, MAX_BULLET_LEN)?;
        validate_required("Duration", &self.duration, MAX_DURATION_LEN)?;
        validate_required("Package type", &self.package_type, MAX_PACKAGE_TYPE_LEN)?;
        if let Some(url) = &self.image_url {
            validate_max_len("Image URL", url, MAX_IMAGE_URL_LEN)?;
        }
        if let Some(public_id) = &self.image_public_id {
            validate_max_len("Image public id", public_id, MAX_IMAGE_ID_LEN)?;
        }
        validate_prices(self.total_price, self.discounted_price)
    }
}

/// Request for creating a course
#[derive(Debug, Deserialize)]
pub struct CreateCourseRequest {
    pub title: String,
    pub description: String,
    pub bullet_pt1: String,
    pub bullet_pt2: String,
    pub bullet_pt3: String,
    pub duration: String,
    pub package_type: String,
    pub total_price: f64,
    pub discounted_price: Option<f64>,
    pub image_url: Option<String>,
    pub image_public_id: Option<String>,
}

impl CreateCourseRequest {
    /// The course this request would store
    pub fn into_course(self) -> Course {
        let now = Utc::now();
        Course {
            id: Uuid::nil(),
            title: self.title,
            description: self.description,
            bullet_pt1: self.bullet_pt1,
            bullet_pt2: self.bullet_pt2,
            bullet_pt3: self.bullet_pt3,
            duration: self.duration,
            package_type: self.package_type,
            total_price: self.total_price,
            discounted_price: self.discounted_price,
            image_url: self.image_url,
            image_public_id: self.image_public_id,
            state: LifecycleState::Active,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update of a course
#[derive(Debug, Default, Deserialize)]
pub struct UpdateCourseRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub bullet_pt1: Option<String>,
    pub bullet_pt2: Option<String>,
    pub bullet_pt3: Option<String>,
    pub duration: Option<String>,
    pub package_type: Option<String>,
    pub total_price: Option<f64>,
    pub discounted_price: Option<f64>,
    pub image_url: Option<String>,
    pub image_public_id: Option<String>,
}

impl UpdateCourseRequest {
    pub fn apply_to(self, course: &mut Course) {
        if let Some(title) = self.title {
            course.title = title;
        }
        if let Some(description) = self.description {
            course.description = description;
        }
        if let Some(bullet) = self.bullet_pt1 {
            course.bullet_pt1 = bullet;
        }
        if let Some(bullet) = self.bullet_pt2 {
            course.bullet_pt2 = bullet;
        }
        if let Some(bullet) = self.bullet_pt3 {
            course.bullet_pt3 = bullet;
        }
        if let Some(duration) = self.duration {
            course.duration = duration;
        }
        if let Some(package_type) = self.package_type {
            course.package_type = package_type;
        }
        if let Some(total_price) = self.total_price {
            course.total_price = total_price;
        }
        if self.discounted_price.is_some() {
            course.discounted_price = self.discounted_price;
        }
        if self.image_url.is_some() {
            course.image_url = self.image_url;
        }
        if self.image_public_id.is_some() {
            course.image_public_id = self.image_public_id;
        }
    }
}

/// Filters for listing courses
#[derive(Debug, Default, Deserialize)]
pub struct CourseQuery {
    pub state: Option<LifecycleState>,
}

/// Case-insensitive title search
#[derive(Debug, Deserialize)]
pub struct CourseSearchQuery {
    pub q: String,
}

/// Discounted-price range filter
#[derive(Debug, Deserialize)]
pub struct PriceRangeQuery {
    pub min_price: f64,
    pub max_price: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CreateCourseRequest {
        CreateCourseRequest {
            title: "Manual Beginner".to_string(),
            description: "Ten lessons in a manual car".to_string(),
            bullet_pt1: "Pick-up and drop-off".to_string(),
            bullet_pt2: "Accredited instructors".to_string(),
            bullet_pt3: "Test preparation".to_string(),
            duration: "10 hours".to_string(),
            package_type: "manual".to_string(),
            total_price: 650.0,
            discounted_price: Some(600.0),
            image_url: None,
            image_public_id: None,
        }
    }

    #[test]
    fn new_courses_start_active() {
        let course = request().into_course();
        assert_eq!(course.state, LifecycleState::Active);
        assert!(course.validate().is_ok());
    }

    #[test]
    fn over_long_title_is_rejected() {
        let mut course = request().into_course();
        course.title = "t".repeat(MAX_TITLE_LEN + 1);
        assert!(course.validate().is_err());
    }

    #[test]
    fn update_is_validated_against_the_merged_course() {
        let mut course = request().into_course();
        UpdateCourseRequest {
            total_price: Some(500.0),
            ..Default::default()
        }
        .apply_to(&mut course);

        assert_eq!(course.total_price, 500.0);
        assert_eq!(course.discounted_price, Some(600.0));
        assert!(course.validate().is_err());
    }
}
