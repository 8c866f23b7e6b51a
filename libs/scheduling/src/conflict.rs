//! Instructor double-booking detection
//!
//! Session length is always counted in minutes: the domain field, the
//! database column and the interval arithmetic in SQL all agree on it.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::SchedulingError;
use crate::model::ClassSession;

/// Longest session that may be scheduled, one day
pub const MAX_DURATION_MINUTES: i32 = 24 * 60;

/// Half-open `[start, end)` interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// Window for a proposed session, rejecting durations outside
    /// `1..=MAX_DURATION_MINUTES` and ends past the last representable
    /// instant
    pub fn from_minutes(
        start: DateTime<Utc>,
        duration_minutes: i32,
    ) -> Result<Self, SchedulingError> {
        validate_duration(duration_minutes)?;
        let end = start
            .checked_add_signed(Duration::minutes(i64::from(duration_minutes)))
            .ok_or_else(|| SchedulingError::Validation("start time out of range".to_string()))?;
        Ok(Self { start, end })
    }

    /// Window for an already stored session
    ///
    /// Saturates at the latest representable instant instead of overflowing.
    pub fn spanning(start: DateTime<Utc>, duration_minutes: i32) -> Self {
        let end = start
            .checked_add_signed(Duration::minutes(i64::from(duration_minutes)))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self { start, end }
    }

    /// Whether the two windows share any instant
    ///
    /// Windows that merely touch (one ends when the other starts) do not.
    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        self.start < other.end && other.start < self.end
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start.to_rfc3339(), self.end.to_rfc3339())
    }
}

/// Reject durations the scheduler cannot represent
pub fn validate_duration(duration_minutes: i32) -> Result<(), SchedulingError> {
    if !(1..=MAX_DURATION_MINUTES).contains(&duration_minutes) {
        return Err(SchedulingError::Validation(format!(
            "duration must be between 1 and {} minutes, got {}",
            MAX_DURATION_MINUTES, duration_minutes
        )));
    }
    Ok(())
}

/// Outcome of a conflict check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum ConflictResult {
    Clear,
    Conflict { session_id: Uuid, window: TimeWindow },
}

impl ConflictResult {
    pub fn from_existing(existing: Option<&ClassSession>) -> Self {
        match existing {
            Some(session) => ConflictResult::Conflict {
                session_id: session.id,
                window: session.window(),
            },
            None => ConflictResult::Clear,
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, ConflictResult::Conflict { .. })
    }

    /// Turn a conflict into the error a write is rejected with
    pub fn into_result(self) -> Result<(), SchedulingError> {
        match self {
            ConflictResult::Clear => Ok(()),
            ConflictResult::Conflict { session_id, window } => {
                Err(SchedulingError::SchedulingConflict { session_id, window })
            }
        }
    }
}

/// Earliest active session of `instructor_id` overlapping `proposed`
///
/// `exclude` names the session being updated so it never conflicts with
/// itself.
pub fn find_conflict<'a, I>(
    sessions: I,
    instructor_id: Uuid,
    proposed: &TimeWindow,
    exclude: Option<Uuid>,
) -> Option<&'a ClassSession>
where
    I: IntoIterator<Item = &'a ClassSession>,
{
    sessions
        .into_iter()
        .filter(|s| s.instructor_id == instructor_id && s.is_active())
        .filter(|s| exclude != Some(s.id))
        .filter(|s| s.window().overlaps(proposed))
        .min_by_key(|s| s.start_at)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LifecycleState;
    use chrono::TimeZone;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 3, 4, hour, minute, 0).unwrap()
    }

    fn session(instructor_id: Uuid, start: DateTime<Utc>, minutes: i32) -> ClassSession {
        ClassSession {
            id: Uuid::new_v4(),
            course_id: Uuid::new_v4(),
            instructor_id,
            start_at: start,
            duration_minutes: minutes,
            state: LifecycleState::Active,
            created_at: start,
            updated_at: start,
        }
    }

    #[test]
    fn duration_is_counted_in_minutes() {
        let window = TimeWindow::from_minutes(at(10, 0), 90).unwrap();
        assert_eq!(window.end, at(11, 30));
    }

    #[test]
    fn non_positive_and_oversized_durations_are_rejected() {
        for minutes in [0, -30, MAX_DURATION_MINUTES + 1] {
            let err = TimeWindow::from_minutes(at(10, 0), minutes).unwrap_err();
            assert!(matches!(err, SchedulingError::Validation(_)), "{minutes}");
        }
        assert!(TimeWindow::from_minutes(at(0, 0), MAX_DURATION_MINUTES).is_ok());
    }

    #[test]
    fn start_near_the_end_of_time_is_a_validation_error() {
        let start: DateTime<Utc> = "+262142-12-31T23:30:00Z".parse().unwrap();

        let err = TimeWindow::from_minutes(start, 60).unwrap_err();
        assert_eq!(err.to_string(), "start time out of range");

        let stored = TimeWindow::spanning(start, 60);
        assert_eq!(stored.end, DateTime::<Utc>::MAX_UTC);
    }

    #[test]
    fn touching_windows_do_not_overlap() {
        let morning = TimeWindow::spanning(at(10, 0), 60);
        let next = TimeWindow::spanning(at(11, 0), 30);
        assert!(!morning.overlaps(&next));
        assert!(!next.overlaps(&morning));
    }

    #[test]
    fn nested_and_partial_windows_overlap() {
        let long = TimeWindow::spanning(at(9, 0), 180);
        let inner = TimeWindow::spanning(at(10, 0), 15);
        let tail = TimeWindow::spanning(at(11, 45), 60);
        assert!(long.overlaps(&inner));
        assert!(inner.overlaps(&long));
        assert!(long.overlaps(&tail));
    }

    #[test]
    fn finds_overlapping_session_for_same_instructor_only() {
        let instructor = Uuid::new_v4();
        let other = Uuid::new_v4();
        let sessions = vec![session(instructor, at(10, 0), 60), session(other, at(10, 30), 60)];

        let proposed = TimeWindow::spanning(at(10, 30), 30);
        let hit = find_conflict(&sessions, instructor, &proposed, None).unwrap();
        assert_eq!(hit.id, sessions[0].id);

        let later = TimeWindow::spanning(at(11, 0), 30);
        assert!(find_conflict(&sessions, instructor, &later, None).is_none());
    }

    #[test]
    fn cancelled_and_excluded_sessions_are_ignored() {
        let instructor = Uuid::new_v4();
        let mut cancelled = session(instructor, at(10, 0), 60);
        cancelled.state = LifecycleState::Cancelled;
        let current = session(instructor, at(13, 0), 60);
        let sessions = vec![cancelled, current.clone()];

        let proposed = TimeWindow::spanning(at(10, 15), 30);
        assert!(find_conflict(&sessions, instructor, &proposed, None).is_none());

        let moved = TimeWindow::spanning(at(13, 30), 60);
        assert!(find_conflict(&sessions, instructor, &moved, Some(current.id)).is_none());
        assert!(find_conflict(&sessions, instructor, &moved, None).is_some());
    }

    #[test]
    fn earliest_conflict_is_reported() {
        let instructor = Uuid::new_v4();
        let sessions = vec![
            session(instructor, at(12, 0), 60),
            session(instructor, at(10, 0), 60),
        ];
        let proposed = TimeWindow::spanning(at(9, 0), 8 * 60);
        let hit = find_conflict(&sessions, instructor, &proposed, None).unwrap();
        assert_eq!(hit.start_at, at(10, 0));
    }

    #[test]
    fn conflict_result_names_the_window() {
        let existing = session(Uuid::new_v4(), at(10, 0), 60);
        let result = ConflictResult::from_existing(Some(&existing));
        assert!(result.is_conflict());

        let err = result.into_result().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Instructor already has a class from 2030-03-04T10:00:00+00:00 to 2030-03-04T11:00:00+00:00"
        );
        assert!(ConflictResult::from_existing(None).into_result().is_ok());
    }
}
