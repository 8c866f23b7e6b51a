//! Domain types shared by the scheduling services and their stores

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::conflict::TimeWindow;

/// Raised when a stored or submitted label does not name a known variant
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}'")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseEnumError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// Soft-delete lifecycle shared by class sessions and courses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    #[default]
    Active,
    Cancelled,
}

impl LifecycleState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleState::Active => "active",
            LifecycleState::Cancelled => "cancelled",
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, LifecycleState::Active)
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LifecycleState {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(LifecycleState::Active),
            "cancelled" => Ok(LifecycleState::Cancelled),
            other => Err(ParseEnumError::new("lifecycle state", other)),
        }
    }
}

/// Role a user holds in the school
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Student,
    Instructor,
    Admin,
}

impl UserRole {
    pub const ALL: [UserRole; 3] = [UserRole::Student, UserRole::Instructor, UserRole::Admin];

    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Student => "student",
            UserRole::Instructor => "instructor",
            UserRole::Admin => "admin",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(UserRole::Student),
            "instructor" => Ok(UserRole::Instructor),
            "admin" => Ok(UserRole::Admin),
            other => Err(ParseEnumError::new("user role", other)),
        }
    }
}

/// Booking status
///
/// `Cancelled`, `Attended` and `NoShow` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    #[default]
    Pending,
    Confirmed,
    Cancelled,
    Attended,
    NoShow,
}

impl BookingStatus {
    pub const ALL: [BookingStatus; 5] = [
        BookingStatus::Pending,
        BookingStatus::Confirmed,
        BookingStatus::Cancelled,
        BookingStatus::Attended,
        BookingStatus::NoShow,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Attended => "attended",
            BookingStatus::NoShow => "no_show",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            BookingStatus::Cancelled | BookingStatus::Attended | BookingStatus::NoShow
        )
    }

    /// Whether a booking in this status may move to `next`
    ///
    /// Re-applying the current status is always allowed.
    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        use BookingStatus::*;

        if *self == next {
            return true;
        }

        matches!(
            (self, next),
            (Pending, Confirmed)
                | (Pending, Cancelled)
                | (Confirmed, Cancelled)
                | (Confirmed, Attended)
                | (Confirmed, NoShow)
        )
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BookingStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ParseEnumError::new("booking status", s))
    }
}

/// A scheduled instructional time slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassSession {
    pub id: Uuid,
    pub course_id: Uuid,
    pub instructor_id: Uuid,
    pub start_at: DateTime<Utc>,
    /// Length of the session in minutes
    pub duration_minutes: i32,
    pub state: LifecycleState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ClassSession {
    /// The `[start, start + duration)` window this session occupies
    pub fn window(&self) -> TimeWindow {
        TimeWindow::spanning(self.start_at, self.duration_minutes)
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }
}

/// Input for scheduling a new class session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewClassSession {
    pub course_id: Uuid,
    pub instructor_id: Uuid,
    pub start_at: DateTime<Utc>,
    pub duration_minutes: i32,
    pub state: LifecycleState,
}

/// Partial update of a class session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassSessionChanges {
    pub start_at: Option<DateTime<Utc>>,
    pub duration_minutes: Option<i32>,
    pub state: Option<LifecycleState>,
}

impl ClassSessionChanges {
    pub fn state(state: LifecycleState) -> Self {
        Self {
            state: Some(state),
            ..Self::default()
        }
    }

    pub fn reschedules(&self) -> bool {
        self.start_at.is_some() || self.duration_minutes.is_some()
    }
}

/// Optional filters for listing class sessions
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionFilter {
    pub course_id: Option<Uuid>,
    pub instructor_id: Option<Uuid>,
    pub state: Option<LifecycleState>,
}

impl SessionFilter {
    pub fn matches(&self, session: &ClassSession) -> bool {
        self.course_id.is_none_or(|id| session.course_id == id)
            && self.instructor_id.is_none_or(|id| session.instructor_id == id)
            && self.state.is_none_or(|state| session.state == state)
    }
}

/// Offset pagination window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub skip: i64,
    pub limit: i64,
}

impl Page {
    pub const DEFAULT_LIMIT: i64 = 100;
    pub const MAX_LIMIT: i64 = 200;

    /// Build a page, clamping `skip` to zero and `limit` into `1..=MAX_LIMIT`
    pub fn new(skip: Option<i64>, limit: Option<i64>) -> Self {
        Self {
            skip: skip.unwrap_or(0).max(0),
            limit: limit
                .unwrap_or(Self::DEFAULT_LIMIT)
                .clamp(1, Self::MAX_LIMIT),
        }
    }

    /// Everything, for internal fan-outs that must not be truncated
    pub fn all() -> Self {
        Self {
            skip: 0,
            limit: i64::MAX,
        }
    }

    pub fn apply<T>(&self, items: impl IntoIterator<Item = T>) -> Vec<T> {
        items
            .into_iter()
            .skip(usize::try_from(self.skip).unwrap_or(usize::MAX))
            .take(usize::try_from(self.limit).unwrap_or(usize::MAX))
            .collect()
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// A student's reservation of a class session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub student_id: Uuid,
    pub class_session_id: Uuid,
    pub phone_no: String,
    /// Pickup area
    pub suburb: Option<String>,
    pub message: String,
    pub status: BookingStatus,
    pub remarks: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Contact details a student supplies when booking
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookingDetails {
    pub phone_no: String,
    pub suburb: Option<String>,
    pub message: String,
}

/// A booking ready to be persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBooking {
    pub student_id: Uuid,
    pub class_session_id: Uuid,
    pub details: BookingDetails,
    pub status: BookingStatus,
}

/// Partial update of a booking's free-form fields
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookingChanges {
    pub phone_no: Option<String>,
    pub suburb: Option<String>,
    pub message: Option<String>,
    pub remarks: Option<String>,
}

/// Optional filters for listing bookings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookingFilter {
    pub student_id: Option<Uuid>,
    pub class_session_id: Option<Uuid>,
    pub status: Option<BookingStatus>,
}

impl BookingFilter {
    pub fn matches(&self, booking: &Booking) -> bool {
        self.student_id.is_none_or(|id| booking.student_id == id)
            && self
                .class_session_id
                .is_none_or(|id| booking.class_session_id == id)
            && self.status.is_none_or(|status| booking.status == status)
    }
}
