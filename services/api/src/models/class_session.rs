//! Class-session request payloads
//!
//! The session itself is [`scheduling::model::ClassSession`].

use chrono::{DateTime, Utc};
use scheduling::model::{ClassSessionChanges, LifecycleState, NewClassSession, SessionFilter};
use serde::Deserialize;
use uuid::Uuid;

/// Request for scheduling a class session
#[derive(Debug, Deserialize)]
pub struct CreateClassSessionRequest {
    pub course_id: Uuid,
    pub instructor_id: Uuid,
    pub start_at: DateTime<Utc>,
    pub duration_minutes: i32,
    #[serde(default)]
    pub state: LifecycleState,
}

impl From<CreateClassSessionRequest> for NewClassSession {
    fn from(request: CreateClassSessionRequest) -> Self {
        NewClassSession {
            course_id: request.course_id,
            instructor_id: request.instructor_id,
            start_at: request.start_at,
            duration_minutes: request.duration_minutes,
            state: request.state,
        }
    }
}

/// Partial update of a class session
#[derive(Debug, Default, Deserialize)]
pub struct UpdateClassSessionRequest {
    pub start_at: Option<DateTime<Utc>>,
    pub duration_minutes: Option<i32>,
    pub state: Option<LifecycleState>,
}

impl From<UpdateClassSessionRequest> for ClassSessionChanges {
    fn from(request: UpdateClassSessionRequest) -> Self {
        ClassSessionChanges {
            start_at: request.start_at,
            duration_minutes: request.duration_minutes,
            state: request.state,
        }
    }
}

/// Filters for listing class sessions
#[derive(Debug, Default, Deserialize)]
pub struct ClassSessionQuery {
    pub course_id: Option<Uuid>,
    pub instructor_id: Option<Uuid>,
    pub state: Option<LifecycleState>,
}

impl From<ClassSessionQuery> for SessionFilter {
    fn from(query: ClassSessionQuery) -> Self {
        SessionFilter {
            course_id: query.course_id,
            instructor_id: query.instructor_id,
            state: query.state,
        }
    }
}

/// Look-ahead for upcoming sessions
#[derive(Debug, Deserialize)]
pub struct UpcomingQuery {
    #[serde(default = "default_hours_ahead")]
    pub hours_ahead: i64,
}

fn default_hours_ahead() -> i64 {
    24
}

/// Proposed slot for a read-only conflict check
#[derive(Debug, Deserialize)]
pub struct ConflictQuery {
    pub instructor_id: Uuid,
    pub start_at: DateTime<Utc>,
    pub duration_minutes: i32,
    pub exclude_session_id: Option<Uuid>,
}
