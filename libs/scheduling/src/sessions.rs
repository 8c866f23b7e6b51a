//! Class-session service enforcing the instructor overlap rule

use chrono::{DateTime, Duration, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::conflict::{ConflictResult, TimeWindow, validate_duration};
use crate::error::{SchedulingError, SchedulingResult};
use crate::model::{
    ClassSession, ClassSessionChanges, LifecycleState, NewClassSession, Page, SessionFilter,
    UserRole,
};
use crate::store::{Directory, SessionStore, SessionTx};

/// Bounds for the upcoming-sessions look-ahead, in hours
pub const UPCOMING_HOURS: std::ops::RangeInclusive<i64> = 1..=168;

/// Check that `user_id` exists and holds `role`
///
/// A missing user is reported as a missing `role` entity, a user with another
/// role as a validation failure.
pub(crate) async fn require_role<D>(
    directory: &D,
    user_id: Uuid,
    role: UserRole,
) -> SchedulingResult<()>
where
    D: Directory + ?Sized,
{
    match directory.user_role(user_id).await? {
        None => Err(SchedulingError::not_found(role.as_str(), user_id)),
        Some(actual) if actual != role => Err(SchedulingError::Validation(format!(
            "user {} has role '{}', expected '{}'",
            user_id, actual, role
        ))),
        Some(_) => Ok(()),
    }
}

/// Schedules, reschedules and cancels class sessions
#[derive(Clone)]
pub struct ClassSessionService<S, D> {
    store: S,
    directory: D,
}

impl<S, D> ClassSessionService<S, D>
where
    S: SessionStore,
    D: Directory,
{
    /// Create a new class-session service
    pub fn new(store: S, directory: D) -> Self {
        Self { store, directory }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Get a class session by ID
    pub async fn get(&self, id: Uuid) -> SchedulingResult<ClassSession> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| SchedulingError::not_found("class session", id))
    }

    pub async fn list(
        &self,
        filter: &SessionFilter,
        page: Page,
    ) -> SchedulingResult<Vec<ClassSession>> {
        Ok(self.store.list(filter, page).await?)
    }

    /// Active sessions starting between `now` and `now + hours_ahead`
    pub async fn upcoming(
        &self,
        now: DateTime<Utc>,
        hours_ahead: i64,
    ) -> SchedulingResult<Vec<ClassSession>> {
        if !UPCOMING_HOURS.contains(&hours_ahead) {
            return Err(SchedulingError::Validation(format!(
                "hours_ahead must be between {} and {}",
                UPCOMING_HOURS.start(),
                UPCOMING_HOURS.end()
            )));
        }

        let until = now + Duration::hours(hours_ahead);
        Ok(self.store.starting_between(now, until).await?)
    }

    /// Read-only overlap check for a proposed slot
    pub async fn check_conflict(
        &self,
        instructor_id: Uuid,
        start_at: DateTime<Utc>,
        duration_minutes: i32,
        exclude: Option<Uuid>,
    ) -> SchedulingResult<ConflictResult> {
        let window = TimeWindow::from_minutes(start_at, duration_minutes)?;
        let existing = self
            .store
            .find_overlapping(instructor_id, window, exclude)
            .await?;

        Ok(ConflictResult::from_existing(existing.as_ref()))
    }

    /// Schedule a new class session
    ///
    /// Active sessions are checked for overlap and inserted while the
    /// instructor's schedule is locked.
    pub async fn create(&self, new: NewClassSession) -> SchedulingResult<ClassSession> {
        let window = TimeWindow::from_minutes(new.start_at, new.duration_minutes)?;

        match self.directory.course_state(new.course_id).await? {
            None => return Err(SchedulingError::not_found("course", new.course_id)),
            Some(LifecycleState::Cancelled) => {
                return Err(SchedulingError::Validation(format!(
                    "course {} is cancelled",
                    new.course_id
                )));
            }
            Some(LifecycleState::Active) => {}
        }
        require_role(&self.directory, new.instructor_id, UserRole::Instructor).await?;

        let mut tx = self.store.lock_instructor(new.instructor_id).await?;
        // Checked before `insert`, the only write made through `tx`
        if new.state.is_active() {
            let existing = tx
                .find_overlapping(new.instructor_id, window, None)
                .await?;
            reject_conflict(new.instructor_id, existing.as_ref())?;
        }

        let session = tx.insert(&new).await?;
        tx.commit().await?;

        info!(
            session_id = %session.id,
            instructor_id = %session.instructor_id,
            start_at = %session.start_at,
            duration_minutes = session.duration_minutes,
            "Class session scheduled"
        );

        Ok(session)
    }

    /// Apply a partial update
    ///
    /// The overlap check runs when the result is active and either the time
    /// window changed or the session was cancelled before.
    pub async fn update(
        &self,
        id: Uuid,
        changes: ClassSessionChanges,
    ) -> SchedulingResult<ClassSession> {
        if let Some(duration) = changes.duration_minutes {
            validate_duration(duration)?;
        }

        let current = self.get(id).await?;
        let mut tx = self.store.lock_instructor(current.instructor_id).await?;
        let mut session = tx
            .get(id)
            .await?
            .ok_or_else(|| SchedulingError::not_found("class session", id))?;

        let was_active = session.is_active();
        if let Some(start_at) = changes.start_at {
            session.start_at = start_at;
        }
        if let Some(duration) = changes.duration_minutes {
            session.duration_minutes = duration;
        }
        if let Some(state) = changes.state {
            session.state = state;
        }

        let window = TimeWindow::from_minutes(session.start_at, session.duration_minutes)?;

        // Nothing has been written through `tx` yet, so a rejection here
        // leaves the stored session as it was, whatever the store.
        let reactivated = !was_active && session.is_active();
        if session.is_active() && (reactivated || changes.reschedules()) {
            let existing = tx
                .find_overlapping(session.instructor_id, window, Some(id))
                .await?;
            reject_conflict(session.instructor_id, existing.as_ref())?;
        }

        let saved = tx.save(&session).await?;
        tx.commit().await?;

        info!(session_id = %id, state = %saved.state, "Class session updated");

        Ok(saved)
    }

    /// Take a session out of conflict consideration without deleting it
    pub async fn cancel(&self, id: Uuid) -> SchedulingResult<ClassSession> {
        self.update(id, ClassSessionChanges::state(LifecycleState::Cancelled))
            .await
    }

    /// Bring a cancelled session back, subject to the overlap check
    pub async fn activate(&self, id: Uuid) -> SchedulingResult<ClassSession> {
        self.update(id, ClassSessionChanges::state(LifecycleState::Active))
            .await
    }

    pub async fn delete(&self, id: Uuid) -> SchedulingResult<()> {
        if !self.store.delete(id).await? {
            return Err(SchedulingError::not_found("class session", id));
        }
        info!(session_id = %id, "Class session deleted");
        Ok(())
    }

    /// Delete every session of a course, returning how many were removed
    pub async fn delete_for_course(&self, course_id: Uuid) -> SchedulingResult<u64> {
        let removed = self.store.delete_by_course(course_id).await?;
        info!(%course_id, removed, "Class sessions deleted for course");
        Ok(removed)
    }

    /// Delete every session of an instructor, returning how many were removed
    pub async fn delete_for_instructor(&self, instructor_id: Uuid) -> SchedulingResult<u64> {
        let removed = self.store.delete_by_instructor(instructor_id).await?;
        info!(%instructor_id, removed, "Class sessions deleted for instructor");
        Ok(removed)
    }
}

fn reject_conflict(instructor_id: Uuid, existing: Option<&ClassSession>) -> SchedulingResult<()> {
    let result = ConflictResult::from_existing(existing);
    if let ConflictResult::Conflict { session_id, window } = result {
        warn!(
            %instructor_id,
            conflicting_session = %session_id,
            %window,
            "Rejected overlapping class session"
        );
    }
    result.into_result()
}
