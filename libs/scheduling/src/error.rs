//! Error types for scheduling operations

use thiserror::Error;
use uuid::Uuid;

use crate::conflict::TimeWindow;

/// Failure reported by a store implementation
#[derive(Error, Debug)]
pub enum StoreError {
    /// A uniqueness rule enforced by the store rejected the write
    #[error("unique constraint '{0}' violated")]
    UniqueViolation(String),

    /// Any other backend failure
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

/// Type alias for Result with StoreError
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors surfaced by the scheduling services
#[derive(Error, Debug)]
pub enum SchedulingError {
    /// A referenced student, instructor, course, session or booking is missing
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: Uuid },

    /// The proposed session overlaps an active session of the same instructor
    #[error("Instructor already has a class from {window}")]
    SchedulingConflict { session_id: Uuid, window: TimeWindow },

    /// The student already holds a booking for the class session
    #[error("Student {student_id} already has a booking for class session {class_session_id}")]
    DuplicateBooking {
        student_id: Uuid,
        class_session_id: Uuid,
    },

    /// Malformed input, rejected before any check runs
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl SchedulingError {
    pub fn not_found(entity: &'static str, id: Uuid) -> Self {
        SchedulingError::NotFound { entity, id }
    }
}

/// Type alias for Result with SchedulingError
pub type SchedulingResult<T> = Result<T, SchedulingError>;
