//! In-process store backing the scheduling services
//!
//! All state sits behind one async mutex. A [`MemoryTx`] holds that mutex
//! for its whole lifetime, so units of work never interleave; its writes are
//! applied immediately and `commit` only releases the lock.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::conflict::{TimeWindow, find_conflict};
use crate::error::{StoreError, StoreResult};
use crate::model::{
    Booking, BookingFilter, ClassSession, LifecycleState, NewBooking, NewClassSession, Page,
    SessionFilter, UserRole,
};
use crate::store::{BOOKING_PAIR_CONSTRAINT, BookingStore, Directory, SessionStore, SessionTx};

#[derive(Debug, Default)]
struct MemoryState {
    sessions: HashMap<Uuid, ClassSession>,
    bookings: HashMap<Uuid, Booking>,
    users: HashMap<Uuid, UserRole>,
    courses: HashMap<Uuid, LifecycleState>,
}

impl MemoryState {
    fn overlapping(
        &self,
        instructor_id: Uuid,
        window: &TimeWindow,
        exclude: Option<Uuid>,
    ) -> Option<ClassSession> {
        find_conflict(self.sessions.values(), instructor_id, window, exclude).cloned()
    }

    fn insert_session(&mut self, new: &NewClassSession) -> ClassSession {
        let now = Utc::now();
        let session = ClassSession {
            id: Uuid::new_v4(),
            course_id: new.course_id,
            instructor_id: new.instructor_id,
            start_at: new.start_at,
            duration_minutes: new.duration_minutes,
            state: new.state,
            created_at: now,
            updated_at: now,
        };
        self.sessions.insert(session.id, session.clone());
        session
    }

    fn save_session(&mut self, session: &ClassSession) -> StoreResult<ClassSession> {
        let stored = self
            .sessions
            .get_mut(&session.id)
            .ok_or_else(|| anyhow!("class session {} does not exist", session.id))?;

        stored.start_at = session.start_at;
        stored.duration_minutes = session.duration_minutes;
        stored.state = session.state;
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }
}

/// Shared in-memory store
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user with the given role, returning its ID
    pub async fn add_user(&self, role: UserRole) -> Uuid {
        let id = Uuid::new_v4();
        self.state.lock().await.users.insert(id, role);
        id
    }

    /// Register a course in the given state, returning its ID
    pub async fn add_course(&self, state: LifecycleState) -> Uuid {
        let id = Uuid::new_v4();
        self.state.lock().await.courses.insert(id, state);
        id
    }
}

#[async_trait]
impl Directory for MemoryStore {
    async fn user_role(&self, user_id: Uuid) -> StoreResult<Option<UserRole>> {
        Ok(self.state.lock().await.users.get(&user_id).copied())
    }

    async fn course_state(&self, course_id: Uuid) -> StoreResult<Option<LifecycleState>> {
        Ok(self.state.lock().await.courses.get(&course_id).copied())
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    type Tx = MemoryTx;

    async fn get(&self, id: Uuid) -> StoreResult<Option<ClassSession>> {
        Ok(self.state.lock().await.sessions.get(&id).cloned())
    }

    async fn list(&self, filter: &SessionFilter, page: Page) -> StoreResult<Vec<ClassSession>> {
        let state = self.state.lock().await;
        let mut sessions: Vec<_> = state
            .sessions
            .values()
            .filter(|s| filter.matches(s))
            .cloned()
            .collect();
        sessions.sort_by_key(|s| (s.start_at, s.id));
        Ok(page.apply(sessions))
    }

    async fn starting_between(
        &self,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> StoreResult<Vec<ClassSession>> {
        let state = self.state.lock().await;
        let mut sessions: Vec<_> = state
            .sessions
            .values()
            .filter(|s| s.is_active() && s.start_at >= from && s.start_at <= until)
            .cloned()
            .collect();
        sessions.sort_by_key(|s| (s.start_at, s.id));
        Ok(sessions)
    }

    async fn find_overlapping(
        &self,
        instructor_id: Uuid,
        window: TimeWindow,
        exclude: Option<Uuid>,
    ) -> StoreResult<Option<ClassSession>> {
        Ok(self
            .state
            .lock()
            .await
            .overlapping(instructor_id, &window, exclude))
    }

    async fn lock_instructor(&self, _instructor_id: Uuid) -> StoreResult<MemoryTx> {
        Ok(MemoryTx {
            state: self.state.clone().lock_owned().await,
        })
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        Ok(self.state.lock().await.sessions.remove(&id).is_some())
    }

    async fn delete_by_course(&self, course_id: Uuid) -> StoreResult<u64> {
        let mut state = self.state.lock().await;
        let before = state.sessions.len();
        state.sessions.retain(|_, s| s.course_id != course_id);
        Ok((before - state.sessions.len()) as u64)
    }

    async fn delete_by_instructor(&self, instructor_id: Uuid) -> StoreResult<u64> {
        let mut state = self.state.lock().await;
        let before = state.sessions.len();
        state.sessions.retain(|_, s| s.instructor_id != instructor_id);
        Ok((before - state.sessions.len()) as u64)
    }
}

/// Unit of work over [`MemoryStore`]
pub struct MemoryTx {
    state: OwnedMutexGuard<MemoryState>,
}

#[async_trait]
impl SessionTx for MemoryTx {
    async fn get(&mut self, id: Uuid) -> StoreResult<Option<ClassSession>> {
        Ok(self.state.sessions.get(&id).cloned())
    }

    async fn find_overlapping(
        &mut self,
        instructor_id: Uuid,
        window: TimeWindow,
        exclude: Option<Uuid>,
    ) -> StoreResult<Option<ClassSession>> {
        Ok(self.state.overlapping(instructor_id, &window, exclude))
    }

    async fn insert(&mut self, session: &NewClassSession) -> StoreResult<ClassSession> {
        Ok(self.state.insert_session(session))
    }

    async fn save(&mut self, session: &ClassSession) -> StoreResult<ClassSession> {
        self.state.save_session(session)
    }

    async fn commit(self) -> StoreResult<()> {
        Ok(())
    }
}

#[async_trait]
impl BookingStore for MemoryStore {
    async fn get(&self, id: Uuid) -> StoreResult<Option<Booking>> {
        Ok(self.state.lock().await.bookings.get(&id).cloned())
    }

    async fn find_by_pair(
        &self,
        student_id: Uuid,
        class_session_id: Uuid,
    ) -> StoreResult<Option<Booking>> {
        let state = self.state.lock().await;
        Ok(state
            .bookings
            .values()
            .find(|b| b.student_id == student_id && b.class_session_id == class_session_id)
            .cloned())
    }

    async fn list(&self, filter: &BookingFilter, page: Page) -> StoreResult<Vec<Booking>> {
        let state = self.state.lock().await;
        let mut bookings: Vec<_> = state
            .bookings
            .values()
            .filter(|b| filter.matches(b))
            .cloned()
            .collect();
        bookings.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(page.apply(bookings))
    }

    async fn insert(&self, new: &NewBooking) -> StoreResult<Booking> {
        let mut state = self.state.lock().await;
        let taken = state.bookings.values().any(|b| {
            b.student_id == new.student_id && b.class_session_id == new.class_session_id
        });
        if taken {
            return Err(StoreError::UniqueViolation(
                BOOKING_PAIR_CONSTRAINT.to_string(),
            ));
        }

        let now = Utc::now();
        let booking = Booking {
            id: Uuid::new_v4(),
            student_id: new.student_id,
            class_session_id: new.class_session_id,
            phone_no: new.details.phone_no.clone(),
            suburb: new.details.suburb.clone(),
            message: new.details.message.clone(),
            status: new.status,
            remarks: None,
            created_at: now,
            updated_at: now,
        };
        state.bookings.insert(booking.id, booking.clone());
        Ok(booking)
    }

    async fn save(&self, booking: &Booking) -> StoreResult<Booking> {
        let mut state = self.state.lock().await;
        let stored = state
            .bookings
            .get_mut(&booking.id)
            .ok_or_else(|| anyhow!("booking {} does not exist", booking.id))?;

        stored.phone_no = booking.phone_no.clone();
        stored.suburb = booking.suburb.clone();
        stored.message = booking.message.clone();
        stored.status = booking.status;
        stored.remarks = booking.remarks.clone();
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        Ok(self.state.lock().await.bookings.remove(&id).is_some())
    }
}
