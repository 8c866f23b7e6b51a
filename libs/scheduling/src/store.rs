//! Persistence seams for the scheduling services

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::conflict::TimeWindow;
use crate::error::StoreResult;
use crate::model::{
    Booking, BookingFilter, ClassSession, LifecycleState, NewBooking, NewClassSession, Page,
    SessionFilter, UserRole,
};

/// Name of the uniqueness rule on `(student_id, class_session_id)`
///
/// Stores report a violated pair with
/// `StoreError::UniqueViolation(BOOKING_PAIR_CONSTRAINT)`.
pub const BOOKING_PAIR_CONSTRAINT: &str = "uq_bookings_student_session";

/// Lookup of users and courses owned by other parts of the system
#[async_trait]
pub trait Directory: Send + Sync {
    async fn user_role(&self, user_id: Uuid) -> StoreResult<Option<UserRole>>;

    async fn course_state(&self, course_id: Uuid) -> StoreResult<Option<LifecycleState>>;
}

/// Class-session persistence
#[async_trait]
pub trait SessionStore: Send + Sync {
    type Tx: SessionTx;

    async fn get(&self, id: Uuid) -> StoreResult<Option<ClassSession>>;

    /// Sessions matching `filter`, ordered by start time
    async fn list(&self, filter: &SessionFilter, page: Page) -> StoreResult<Vec<ClassSession>>;

    /// Active sessions starting within `[from, until]`, ordered by start time
    async fn starting_between(
        &self,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> StoreResult<Vec<ClassSession>>;

    /// Earliest active session of the instructor overlapping `window`
    async fn find_overlapping(
        &self,
        instructor_id: Uuid,
        window: TimeWindow,
        exclude: Option<Uuid>,
    ) -> StoreResult<Option<ClassSession>>;

    /// Open a unit of work serialised against every other unit of work for
    /// the same instructor
    async fn lock_instructor(&self, instructor_id: Uuid) -> StoreResult<Self::Tx>;

    async fn delete(&self, id: Uuid) -> StoreResult<bool>;

    async fn delete_by_course(&self, course_id: Uuid) -> StoreResult<u64>;

    async fn delete_by_instructor(&self, instructor_id: Uuid) -> StoreResult<u64>;
}

/// Unit of work holding an instructor's schedule lock
///
/// Dropping it without [`SessionTx::commit`] abandons the writes where the
/// store supports rollback.
#[async_trait]
pub trait SessionTx: Send {
    async fn get(&mut self, id: Uuid) -> StoreResult<Option<ClassSession>>;

    async fn find_overlapping(
        &mut self,
        instructor_id: Uuid,
        window: TimeWindow,
        exclude: Option<Uuid>,
    ) -> StoreResult<Option<ClassSession>>;

    async fn insert(&mut self, session: &NewClassSession) -> StoreResult<ClassSession>;

    /// Persist start, duration and state of an existing session
    async fn save(&mut self, session: &ClassSession) -> StoreResult<ClassSession>;

    async fn commit(self) -> StoreResult<()>;
}

/// Booking persistence
#[async_trait]
pub trait BookingStore: Send + Sync {
    async fn get(&self, id: Uuid) -> StoreResult<Option<Booking>>;

    async fn find_by_pair(
        &self,
        student_id: Uuid,
        class_session_id: Uuid,
    ) -> StoreResult<Option<Booking>>;

    /// Bookings matching `filter`, newest first
    async fn list(&self, filter: &BookingFilter, page: Page) -> StoreResult<Vec<Booking>>;

    /// Persist a booking, failing with [`BOOKING_PAIR_CONSTRAINT`] when the
    /// pair is already booked
    async fn insert(&self, booking: &NewBooking) -> StoreResult<Booking>;

    /// Persist the mutable fields (contact details, status, remarks)
    async fn save(&self, booking: &Booking) -> StoreResult<Booking>;

    async fn delete(&self, id: Uuid) -> StoreResult<bool>;
}
