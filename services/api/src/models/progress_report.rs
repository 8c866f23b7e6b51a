//! Progress report models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::text_enum;

pub const MAX_REMARKS_LEN: usize = 80;

/// How far a student is through a course
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

text_enum!(ProgressStatus, "progress status", {
    NotStarted => "not_started",
    InProgress => "in_progress",
    Completed => "completed",
});

impl ProgressStatus {
    /// Status implied by a completion percentage
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage <= 0.0 {
            ProgressStatus::NotStarted
        } else if percentage < 100.0 {
            ProgressStatus::InProgress
        } else {
            ProgressStatus::Completed
        }
    }
}

/// A student's progress through a course
#[derive(Debug, Clone, Serialize)]
pub struct ProgressReport {
    pub id: Uuid,
    pub student_id: Uuid,
    pub instructor_id: Option<Uuid>,
    pub course_id: Uuid,
    pub progress_percentage: f64,
    pub status: ProgressStatus,
    pub feedback: Option<String>,
    pub remarks: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request for opening a progress report
#[derive(Debug, Deserialize)]
pub struct CreateProgressReportRequest {
    pub student_id: Uuid,
    pub instructor_id: Option<Uuid>,
    pub course_id: Uuid,
    #[serde(default)]
    pub progress_percentage: f64,
    pub feedback: Option<String>,
    pub remarks: Option<String>,
}

/// Partial update of a progress report
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProgressReportRequest {
    pub instructor_id: Option<Uuid>,
    pub progress_percentage: Option<f64>,
    pub feedback: Option<String>,
    pub remarks: Option<String>,
}

impl UpdateProgressReportRequest {
    pub fn apply_to(self, report: &mut ProgressReport) {
        if self.instructor_id.is_some() {
            report.instructor_id = self.instructor_id;
        }
        if let Some(percentage) = self.progress_percentage {
            report.progress_percentage = percentage;
            report.status = ProgressStatus::from_percentage(percentage);
        }
        if self.feedback.is_some() {
            report.feedback = self.feedback;
        }
        if self.remarks.is_some() {
            report.remarks = self.remarks;
        }
    }
}

/// Request for setting the completion percentage
#[derive(Debug, Deserialize)]
pub struct ProgressPercentageRequest {
    pub progress_percentage: f64,
}

/// Filters for listing progress reports
#[derive(Debug, Default, Deserialize)]
pub struct ProgressReportQuery {
    pub student_id: Option<Uuid>,
    pub course_id: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_follows_percentage() {
        assert_eq!(ProgressStatus::from_percentage(0.0), ProgressStatus::NotStarted);
        assert_eq!(ProgressStatus::from_percentage(0.5), ProgressStatus::InProgress);
        assert_eq!(ProgressStatus::from_percentage(99.9), ProgressStatus::InProgress);
        assert_eq!(ProgressStatus::from_percentage(100.0), ProgressStatus::Completed);
    }

    #[test]
    fn percentage_update_rederives_status() {
        let now = Utc::now();
        let mut report = ProgressReport {
            id: Uuid::new_v4(),
            student_id: Uuid::new_v4(),
            instructor_id: None,
            course_id: Uuid::new_v4(),
            progress_percentage: 40.0,
            status: ProgressStatus::InProgress,
            feedback: None,
            remarks: None,
            created_at: now,
            updated_at: now,
        };

        UpdateProgressReportRequest {
            progress_percentage: Some(100.0),
            feedback: Some("Ready for the test".to_string()),
            ..Default::default()
        }
        .apply_to(&mut report);

        assert_eq!(report.status, ProgressStatus::Completed);
        assert_eq!(report.feedback.as_deref(), Some("Ready for the test"));
    }
}
