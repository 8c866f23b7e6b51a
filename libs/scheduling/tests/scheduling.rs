use chrono::{DateTime, Duration, TimeZone, Utc};
use scheduling::memory::MemoryStore;
use scheduling::model::{
    BookingDetails, BookingFilter, BookingStatus, ClassSessionChanges, LifecycleState,
    NewClassSession, Page, SessionFilter, UserRole,
};
use scheduling::{BookingService, ClassSessionService, ConflictResult, SchedulingError};
use uuid::Uuid;

type Sessions = ClassSessionService<MemoryStore, MemoryStore>;
type Bookings = BookingService<MemoryStore, MemoryStore, MemoryStore>;

struct School {
    store: MemoryStore,
    sessions: Sessions,
    bookings: Bookings,
    course: Uuid,
    instructor: Uuid,
}

impl School {
    async fn new() -> Self {
        let store = MemoryStore::new();
        let course = store.add_course(LifecycleState::Active).await;
        let instructor = store.add_user(UserRole::Instructor).await;
        Self {
            sessions: ClassSessionService::new(store.clone(), store.clone()),
            bookings: BookingService::new(store.clone(), store.clone(), store.clone()),
            store,
            course,
            instructor,
        }
    }

    fn slot(&self, start_at: DateTime<Utc>, duration_minutes: i32) -> NewClassSession {
        NewClassSession {
            course_id: self.course,
            instructor_id: self.instructor,
            start_at,
            duration_minutes,
            state: LifecycleState::Active,
        }
    }
}

fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2030, 5, 6, hour, minute, 0).unwrap()
}

fn details() -> BookingDetails {
    BookingDetails {
        phone_no: "0412 345 678".to_string(),
        suburb: Some("Parramatta".to_string()),
        message: "First lesson".to_string(),
    }
}

#[tokio::test]
async fn overlapping_session_for_same_instructor_is_rejected() {
    let school = School::new().await;
    let first = school.sessions.create(school.slot(at(10, 0), 60)).await.unwrap();

    let err = school
        .sessions
        .create(school.slot(at(10, 30), 30))
        .await
        .unwrap_err();

    match err {
        SchedulingError::SchedulingConflict { session_id, window } => {
            assert_eq!(session_id, first.id);
            assert_eq!(window.start, at(10, 0));
            assert_eq!(window.end, at(11, 0));
        }
        other => panic!("expected a scheduling conflict, got {other:?}"),
    }
}

#[tokio::test]
async fn back_to_back_sessions_are_accepted() {
    let school = School::new().await;
    school.sessions.create(school.slot(at(10, 0), 60)).await.unwrap();
    school.sessions.create(school.slot(at(11, 0), 30)).await.unwrap();
    school.sessions.create(school.slot(at(9, 0), 60)).await.unwrap();

    let all = school
        .sessions
        .list(&SessionFilter::default(), Page::default())
        .await
        .unwrap();
    let starts: Vec<_> = all.iter().map(|s| s.start_at).collect();
    assert_eq!(starts, vec![at(9, 0), at(10, 0), at(11, 0)]);
}

#[tokio::test]
async fn different_instructors_never_conflict() {
    let school = School::new().await;
    let other = school.store.add_user(UserRole::Instructor).await;
    school.sessions.create(school.slot(at(10, 0), 60)).await.unwrap();

    let mut slot = school.slot(at(10, 0), 60);
    slot.instructor_id = other;
    school.sessions.create(slot).await.unwrap();
}

#[tokio::test]
async fn cancelled_session_no_longer_blocks_the_slot() {
    let school = School::new().await;
    let first = school.sessions.create(school.slot(at(10, 0), 60)).await.unwrap();
    school.sessions.cancel(first.id).await.unwrap();

    school.sessions.create(school.slot(at(10, 15), 30)).await.unwrap();
}

#[tokio::test]
async fn reactivating_into_an_occupied_slot_is_rejected() {
    let school = School::new().await;
    let first = school.sessions.create(school.slot(at(10, 0), 60)).await.unwrap();
    school.sessions.cancel(first.id).await.unwrap();
    let second = school.sessions.create(school.slot(at(10, 30), 60)).await.unwrap();

    let err = school.sessions.activate(first.id).await.unwrap_err();
    assert!(matches!(
        err,
        SchedulingError::SchedulingConflict { session_id, .. } if session_id == second.id
    ));

    let still = school.sessions.get(first.id).await.unwrap();
    assert_eq!(still.state, LifecycleState::Cancelled);
}

#[tokio::test]
async fn rescheduling_never_conflicts_with_itself() {
    let school = School::new().await;
    let session = school.sessions.create(school.slot(at(10, 0), 60)).await.unwrap();

    let moved = school
        .sessions
        .update(
            session.id,
            ClassSessionChanges {
                start_at: Some(at(10, 30)),
                duration_minutes: Some(90),
                state: None,
            },
        )
        .await
        .unwrap();

    assert_eq!(moved.start_at, at(10, 30));
    assert_eq!(moved.duration_minutes, 90);
}

#[tokio::test]
async fn rescheduling_onto_another_session_is_rejected() {
    let school = School::new().await;
    school.sessions.create(school.slot(at(10, 0), 60)).await.unwrap();
    let later = school.sessions.create(school.slot(at(12, 0), 60)).await.unwrap();

    let err = school
        .sessions
        .update(
            later.id,
            ClassSessionChanges {
                start_at: Some(at(10, 45)),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, SchedulingError::SchedulingConflict { .. }));

    let stored = school.sessions.get(later.id).await.unwrap();
    assert_eq!(stored.start_at, at(12, 0));
    assert_eq!(stored, later);
}

#[tokio::test]
async fn start_times_past_the_calendar_range_are_validation_errors() {
    let school = School::new().await;
    let far: DateTime<Utc> = "+262142-12-31T23:30:00Z".parse().unwrap();

    let err = school
        .sessions
        .check_conflict(school.instructor, far, 60, None)
        .await
        .unwrap_err();
    assert!(matches!(err, SchedulingError::Validation(_)));

    let err = school.sessions.create(school.slot(far, 60)).await.unwrap_err();
    assert!(matches!(err, SchedulingError::Validation(_)));

    let session = school.sessions.create(school.slot(at(10, 0), 60)).await.unwrap();
    let err = school
        .sessions
        .update(
            session.id,
            ClassSessionChanges {
                start_at: Some(far),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, SchedulingError::Validation(_)));
    assert_eq!(school.sessions.get(session.id).await.unwrap(), session);
}

#[tokio::test]
async fn check_conflict_is_read_only() {
    let school = School::new().await;
    let first = school.sessions.create(school.slot(at(10, 0), 60)).await.unwrap();

    let hit = school
        .sessions
        .check_conflict(school.instructor, at(10, 30), 30, None)
        .await
        .unwrap();
    assert_eq!(
        hit,
        ConflictResult::Conflict {
            session_id: first.id,
            window: first.window()
        }
    );

    let clear = school
        .sessions
        .check_conflict(school.instructor, at(11, 0), 30, None)
        .await
        .unwrap();
    assert_eq!(clear, ConflictResult::Clear);

    let excluded = school
        .sessions
        .check_conflict(school.instructor, at(10, 30), 30, Some(first.id))
        .await
        .unwrap();
    assert_eq!(excluded, ConflictResult::Clear);
}

#[tokio::test]
async fn invalid_sessions_are_rejected_before_any_lookup() {
    let school = School::new().await;

    let err = school.sessions.create(school.slot(at(10, 0), 0)).await.unwrap_err();
    assert!(matches!(err, SchedulingError::Validation(_)));

    let mut missing_course = school.slot(at(10, 0), 60);
    missing_course.course_id = Uuid::new_v4();
    let err = school.sessions.create(missing_course).await.unwrap_err();
    assert!(matches!(err, SchedulingError::NotFound { entity: "course", .. }));

    let mut missing_instructor = school.slot(at(10, 0), 60);
    missing_instructor.instructor_id = Uuid::new_v4();
    let err = school.sessions.create(missing_instructor).await.unwrap_err();
    assert!(matches!(err, SchedulingError::NotFound { entity: "instructor", .. }));

    let mut student_as_instructor = school.slot(at(10, 0), 60);
    student_as_instructor.instructor_id = school.store.add_user(UserRole::Student).await;
    let err = school.sessions.create(student_as_instructor).await.unwrap_err();
    assert!(matches!(err, SchedulingError::Validation(_)));

    let mut cancelled_course = school.slot(at(10, 0), 60);
    cancelled_course.course_id = school.store.add_course(LifecycleState::Cancelled).await;
    let err = school.sessions.create(cancelled_course).await.unwrap_err();
    assert!(matches!(err, SchedulingError::Validation(_)));
}

#[tokio::test]
async fn upcoming_lists_only_active_sessions_in_range() {
    let school = School::new().await;
    let now = at(8, 0);
    let soon = school.sessions.create(school.slot(at(9, 0), 60)).await.unwrap();
    let cancelled = school.sessions.create(school.slot(at(11, 0), 60)).await.unwrap();
    school.sessions.cancel(cancelled.id).await.unwrap();
    school
        .sessions
        .create(school.slot(now + Duration::hours(30), 60))
        .await
        .unwrap();

    let upcoming = school.sessions.upcoming(now, 24).await.unwrap();
    assert_eq!(upcoming.len(), 1);
    assert_eq!(upcoming[0].id, soon.id);

    for hours in [0, 169] {
        let err = school.sessions.upcoming(now, hours).await.unwrap_err();
        assert!(matches!(err, SchedulingError::Validation(_)));
    }
}

#[tokio::test]
async fn bulk_deletes_report_removed_count() {
    let school = School::new().await;
    school.sessions.create(school.slot(at(9, 0), 60)).await.unwrap();
    school.sessions.create(school.slot(at(11, 0), 60)).await.unwrap();

    assert_eq!(school.sessions.delete_for_course(school.course).await.unwrap(), 2);
    assert_eq!(
        school
            .sessions
            .delete_for_instructor(school.instructor)
            .await
            .unwrap(),
        0
    );

    let err = school.sessions.delete(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, SchedulingError::NotFound { .. }));
}

#[tokio::test]
async fn second_booking_for_same_pair_is_a_duplicate() {
    let school = School::new().await;
    let student = school.store.add_user(UserRole::Student).await;
    let c1 = school.sessions.create(school.slot(at(10, 0), 60)).await.unwrap();
    let c2 = school.sessions.create(school.slot(at(12, 0), 60)).await.unwrap();

    let booking = school.bookings.create(student, c1.id, details()).await.unwrap();
    assert_eq!(booking.status, BookingStatus::Pending);

    let err = school
        .bookings
        .create(student, c1.id, details())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SchedulingError::DuplicateBooking { student_id, class_session_id }
            if student_id == student && class_session_id == c1.id
    ));

    school.bookings.create(student, c2.id, details()).await.unwrap();
    assert!(school.bookings.is_duplicate(student, c2.id).await.unwrap());
}

#[tokio::test]
async fn duplicate_check_ignores_booking_status() {
    let school = School::new().await;
    let student = school.store.add_user(UserRole::Student).await;
    let session = school.sessions.create(school.slot(at(10, 0), 60)).await.unwrap();

    let booking = school.bookings.create(student, session.id, details()).await.unwrap();
    school
        .bookings
        .set_status(booking.id, BookingStatus::Cancelled)
        .await
        .unwrap();

    let err = school
        .bookings
        .create(student, session.id, details())
        .await
        .unwrap_err();
    assert!(matches!(err, SchedulingError::DuplicateBooking { .. }));
}

#[tokio::test]
async fn concurrent_bookings_for_one_pair_yield_a_single_booking() {
    let school = School::new().await;
    let student = school.store.add_user(UserRole::Student).await;
    let session = school.sessions.create(school.slot(at(10, 0), 60)).await.unwrap();

    let attempts = (0..8).map(|_| {
        let bookings = school.bookings.clone();
        let session_id = session.id;
        tokio::spawn(async move { bookings.create(student, session_id, details()).await })
    });

    let mut created = 0;
    for handle in attempts.collect::<Vec<_>>() {
        match handle.await.unwrap() {
            Ok(_) => created += 1,
            Err(SchedulingError::DuplicateBooking { .. }) => {}
            Err(other) => panic!("unexpected error {other:?}"),
        }
    }
    assert_eq!(created, 1);

    let filter = BookingFilter {
        class_session_id: Some(session.id),
        ..Default::default()
    };
    let stored = school.bookings.list(&filter, Page::default()).await.unwrap();
    assert_eq!(stored.len(), 1);
}

#[tokio::test]
async fn concurrent_overlapping_sessions_yield_a_single_session() {
    let school = School::new().await;

    let attempts: Vec<_> = (0..8)
        .map(|i| {
            let sessions = school.sessions.clone();
            let slot = school.slot(at(10, i * 5), 60);
            tokio::spawn(async move { sessions.create(slot).await })
        })
        .collect();

    let mut created = 0;
    for handle in attempts {
        match handle.await.unwrap() {
            Ok(_) => created += 1,
            Err(SchedulingError::SchedulingConflict { .. }) => {}
            Err(other) => panic!("unexpected error {other:?}"),
        }
    }
    assert_eq!(created, 1);
}

#[tokio::test]
async fn booking_requires_a_student_and_an_active_session() {
    let school = School::new().await;
    let student = school.store.add_user(UserRole::Student).await;
    let session = school.sessions.create(school.slot(at(10, 0), 60)).await.unwrap();

    let err = school
        .bookings
        .create(Uuid::new_v4(), session.id, details())
        .await
        .unwrap_err();
    assert!(matches!(err, SchedulingError::NotFound { entity: "student", .. }));

    let err = school
        .bookings
        .create(school.instructor, session.id, details())
        .await
        .unwrap_err();
    assert!(matches!(err, SchedulingError::Validation(_)));

    let err = school
        .bookings
        .create(student, Uuid::new_v4(), details())
        .await
        .unwrap_err();
    assert!(matches!(err, SchedulingError::NotFound { entity: "class session", .. }));

    school.sessions.cancel(session.id).await.unwrap();
    let err = school
        .bookings
        .create(student, session.id, details())
        .await
        .unwrap_err();
    assert!(matches!(err, SchedulingError::Validation(_)));

    let mut bad_phone = details();
    bad_phone.phone_no = "not a number".to_string();
    let err = school
        .bookings
        .create(student, session.id, bad_phone)
        .await
        .unwrap_err();
    assert!(matches!(err, SchedulingError::Validation(_)));
}

#[tokio::test]
async fn booking_status_follows_allowed_transitions() {
    let school = School::new().await;
    let student = school.store.add_user(UserRole::Student).await;
    let session = school.sessions.create(school.slot(at(10, 0), 60)).await.unwrap();
    let booking = school.bookings.create(student, session.id, details()).await.unwrap();

    let err = school
        .bookings
        .set_status(booking.id, BookingStatus::Attended)
        .await
        .unwrap_err();
    assert!(matches!(err, SchedulingError::Validation(_)));

    let confirmed = school
        .bookings
        .set_status(booking.id, BookingStatus::Confirmed)
        .await
        .unwrap();
    assert_eq!(confirmed.status, BookingStatus::Confirmed);

    let attended = school
        .bookings
        .set_status(booking.id, BookingStatus::Attended)
        .await
        .unwrap();
    assert_eq!(attended.status, BookingStatus::Attended);

    let same = school
        .bookings
        .set_status(booking.id, BookingStatus::Attended)
        .await
        .unwrap();
    assert_eq!(same.status, BookingStatus::Attended);

    let err = school
        .bookings
        .set_status(booking.id, BookingStatus::Cancelled)
        .await
        .unwrap_err();
    assert!(matches!(err, SchedulingError::Validation(_)));
}

#[tokio::test]
async fn booking_details_update_and_delete() {
    let school = School::new().await;
    let student = school.store.add_user(UserRole::Student).await;
    let session = school.sessions.create(school.slot(at(10, 0), 60)).await.unwrap();
    let booking = school.bookings.create(student, session.id, details()).await.unwrap();

    let updated = school
        .bookings
        .update_details(
            booking.id,
            scheduling::model::BookingChanges {
                suburb: Some("Blacktown".to_string()),
                remarks: Some("Bring licence".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.suburb.as_deref(), Some("Blacktown"));
    assert_eq!(updated.remarks.as_deref(), Some("Bring licence"));
    assert_eq!(updated.phone_no, booking.phone_no);
    assert_eq!(updated.status, BookingStatus::Pending);

    let padded = format!("  {}  ", "1".repeat(scheduling::bookings::MAX_PHONE_LEN));
    let updated = school
        .bookings
        .update_details(
            booking.id,
            scheduling::model::BookingChanges {
                phone_no: Some(padded),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.phone_no, "1".repeat(scheduling::bookings::MAX_PHONE_LEN));

    school.bookings.delete(booking.id).await.unwrap();
    let err = school.bookings.get(booking.id).await.unwrap_err();
    assert!(matches!(err, SchedulingError::NotFound { entity: "booking", .. }));
}
