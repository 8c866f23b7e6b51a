//! Progress report repository for database operations

use common::error::DatabaseResult;
use scheduling::model::Page;
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use super::decode;
use crate::models::progress_report::{ProgressReport, ProgressReportQuery};

/// Unique constraint on `(student_id, course_id)`
pub const STUDENT_COURSE_CONSTRAINT: &str = "uq_progress_reports_student_course";

const COLUMNS: &str = "id, student_id, instructor_id, course_id, progress_percentage, status, \
    feedback, remarks, created_at, updated_at";

fn report_from_row(row: &PgRow) -> DatabaseResult<ProgressReport> {
    Ok(ProgressReport {
        id: row.get("id"),
        student_id: row.get("student_id"),
        instructor_id: row.get("instructor_id"),
        course_id: row.get("course_id"),
        progress_percentage: row.get("progress_percentage"),
        status: decode(row.get("status"))?,
        feedback: row.get("feedback"),
        remarks: row.get("remarks"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

/// Progress report repository
#[derive(Clone)]
pub struct ProgressReportRepository {
    pool: PgPool,
}

impl ProgressReportRepository {
    /// Create a new progress report repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a progress report
    pub async fn create(&self, report: &ProgressReport) -> DatabaseResult<ProgressReport> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO progress_reports (student_id, instructor_id, course_id,
                                          progress_percentage, status, feedback, remarks)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(report.student_id)
        .bind(report.instructor_id)
        .bind(report.course_id)
        .bind(report.progress_percentage)
        .bind(report.status.as_str())
        .bind(&report.feedback)
        .bind(&report.remarks)
        .fetch_one(&self.pool)
        .await?;

        report_from_row(&row)
    }

    /// Get a progress report by ID
    pub async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<ProgressReport>> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM progress_reports WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(report_from_row).transpose()
    }

    /// Get the report of a student for a course
    pub async fn find_by_student_and_course(
        &self,
        student_id: Uuid,
        course_id: Uuid,
    ) -> DatabaseResult<Option<ProgressReport>> {
        let row = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM progress_reports WHERE student_id = $1 AND course_id = $2"
        ))
        .bind(student_id)
        .bind(course_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(report_from_row).transpose()
    }

    /// List progress reports, most recently updated first
    pub async fn list(
        &self,
        query: &ProgressReportQuery,
        page: Page,
    ) -> DatabaseResult<Vec<ProgressReport>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {COLUMNS}
            FROM progress_reports
            WHERE ($1::uuid IS NULL OR student_id = $1)
              AND ($2::uuid IS NULL OR course_id = $2)
            ORDER BY updated_at DESC, id
            LIMIT $3 OFFSET $4
            "#
        ))
        .bind(query.student_id)
        .bind(query.course_id)
        .bind(page.limit)
        .bind(page.skip)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(report_from_row).collect()
    }

    /// Persist the editable fields of a report
    pub async fn update(&self, report: &ProgressReport) -> DatabaseResult<Option<ProgressReport>> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE progress_reports
            SET instructor_id = $2, progress_percentage = $3, status = $4,
                feedback = $5, remarks = $6, updated_at = NOW()
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(report.id)
        .bind(report.instructor_id)
        .bind(report.progress_percentage)
        .bind(report.status.as_str())
        .bind(&report.feedback)
        .bind(&report.remarks)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(report_from_row).transpose()
    }

    /// Delete a progress report by ID
    pub async fn delete(&self, id: Uuid) -> DatabaseResult<bool> {
        let result = sqlx::query("DELETE FROM progress_reports WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete every report of a student
    pub async fn delete_by_student(&self, student_id: Uuid) -> DatabaseResult<u64> {
        let result = sqlx::query("DELETE FROM progress_reports WHERE student_id = $1")
            .bind(student_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
