//! Progress report routes
//!
//! The status of a report is always derived from its percentage.

use axum::{
    Json, Router,
    extract::State,
    response::{IntoResponse, Response},
    routing::{delete, get, put},
};
use chrono::Utc;
use uuid::Uuid;

use super::{created, no_content};
use crate::{
    AppState,
    error::{ApiError, ApiResult},
    extract::{ApiJson, ApiPath, ApiQuery},
    models::{
        DeletedCount, Pagination,
        progress_report::{
            CreateProgressReportRequest, MAX_REMARKS_LEN, ProgressPercentageRequest,
            ProgressReport, ProgressReportQuery, ProgressStatus, UpdateProgressReportRequest,
        },
    },
    repositories::progress_report::STUDENT_COURSE_CONSTRAINT,
    validation::{validate_max_len, validate_percentage},
};

const DUPLICATE_REPORT: &str = "Student already has a progress report for this course";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_reports).post(create_report))
        .route(
            "/student/:student_id/course/:course_id",
            get(report_for_student_course),
        )
        .route("/student/:student_id", delete(delete_student_reports))
        .route(
            "/:id",
            get(get_report).put(update_report).delete(delete_report),
        )
        .route("/:id/percentage", put(set_percentage))
}

fn validate_remarks(remarks: Option<&str>) -> Result<(), String> {
    match remarks {
        Some(remarks) => validate_max_len("Remarks", remarks, MAX_REMARKS_LEN),
        None => Ok(()),
    }
}

pub async fn list_reports(
    State(state): State<AppState>,
    ApiQuery(pagination): ApiQuery<Pagination>,
    ApiQuery(query): ApiQuery<ProgressReportQuery>,
) -> ApiResult<impl IntoResponse> {
    let reports = state
        .progress_report_repository
        .list(&query, pagination.page())
        .await?;

    Ok(Json(reports))
}

/// Open a report; a student has at most one per course
pub async fn create_report(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateProgressReportRequest>,
) -> ApiResult<Response> {
    validate_percentage(payload.progress_percentage).map_err(ApiError::Validation)?;
    validate_remarks(payload.remarks.as_deref()).map_err(ApiError::Validation)?;

    if state
        .user_repository
        .find_by_id(payload.student_id)
        .await?
        .is_none()
    {
        return Err(ApiError::not_found("student", payload.student_id));
    }
    if let Some(instructor_id) = payload.instructor_id {
        if state
            .user_repository
            .find_by_id(instructor_id)
            .await?
            .is_none()
        {
            return Err(ApiError::not_found("instructor", instructor_id));
        }
    }
    if state
        .course_repository
        .find_by_id(payload.course_id)
        .await?
        .is_none()
    {
        return Err(ApiError::not_found("course", payload.course_id));
    }

    if state
        .progress_report_repository
        .find_by_student_and_course(payload.student_id, payload.course_id)
        .await?
        .is_some()
    {
        return Err(ApiError::Conflict(DUPLICATE_REPORT.to_string()));
    }

    let now = Utc::now();
    let report = ProgressReport {
        id: Uuid::nil(),
        student_id: payload.student_id,
        instructor_id: payload.instructor_id,
        course_id: payload.course_id,
        progress_percentage: payload.progress_percentage,
        status: ProgressStatus::from_percentage(payload.progress_percentage),
        feedback: payload.feedback,
        remarks: payload.remarks,
        created_at: now,
        updated_at: now,
    };

    let report = state
        .progress_report_repository
        .create(&report)
        .await
        .map_err(ApiError::on_unique(STUDENT_COURSE_CONSTRAINT, DUPLICATE_REPORT))?;

    tracing::info!(report_id = %report.id, student_id = %report.student_id, "Progress report opened");
    Ok(created(report))
}

pub async fn get_report(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let report = state
        .progress_report_repository
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("progress report", id))?;

    Ok(Json(report))
}

pub async fn report_for_student_course(
    State(state): State<AppState>,
    ApiPath((student_id, course_id)): ApiPath<(Uuid, Uuid)>,
) -> ApiResult<impl IntoResponse> {
    let report = state
        .progress_report_repository
        .find_by_student_and_course(student_id, course_id)
        .await?
        .ok_or_else(|| {
            ApiError::NotFound(format!(
                "progress report for student {} in course {} not found",
                student_id, course_id
            ))
        })?;

    Ok(Json(report))
}

async fn apply_update(
    state: &AppState,
    id: Uuid,
    changes: UpdateProgressReportRequest,
) -> ApiResult<ProgressReport> {
    if let Some(percentage) = changes.progress_percentage {
        validate_percentage(percentage).map_err(ApiError::Validation)?;
    }
    validate_remarks(changes.remarks.as_deref()).map_err(ApiError::Validation)?;

    let mut report = state
        .progress_report_repository
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("progress report", id))?;

    changes.apply_to(&mut report);

    state
        .progress_report_repository
        .update(&report)
        .await?
        .ok_or_else(|| ApiError::not_found("progress report", id))
}

pub async fn update_report(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<UpdateProgressReportRequest>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(apply_update(&state, id, payload).await?))
}

pub async fn set_percentage(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<ProgressPercentageRequest>,
) -> ApiResult<impl IntoResponse> {
    let changes = UpdateProgressReportRequest {
        progress_percentage: Some(payload.progress_percentage),
        ..Default::default()
    };
    Ok(Json(apply_update(&state, id, changes).await?))
}

pub async fn delete_report(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Response> {
    if !state.progress_report_repository.delete(id).await? {
        return Err(ApiError::not_found("progress report", id));
    }
    Ok(no_content())
}

pub async fn delete_student_reports(
    State(state): State<AppState>,
    ApiPath(student_id): ApiPath<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let deleted = state
        .progress_report_repository
        .delete_by_student(student_id)
        .await?;

    Ok(Json(DeletedCount { deleted }))
}
