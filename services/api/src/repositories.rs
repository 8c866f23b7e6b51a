//! Repositories for database operations

use std::fmt::Display;
use std::str::FromStr;

use common::error::{DatabaseError, DatabaseResult};
use scheduling::StoreError;

pub mod booking;
pub mod class_session;
pub mod course;
pub mod directory;
pub mod faq;
pub mod notification;
pub mod payment;
pub mod progress_report;
pub mod review;
pub mod user;

pub use booking::BookingRepository;
pub use class_session::ClassSessionRepository;
pub use course::CourseRepository;
pub use directory::DirectoryRepository;
pub use faq::FaqRepository;
pub use notification::NotificationRepository;
pub use payment::PaymentRepository;
pub use progress_report::ProgressReportRepository;
pub use review::ReviewRepository;
pub use user::UserRepository;

/// Parse a text column into its domain enum
pub(crate) fn decode<T>(raw: String) -> DatabaseResult<T>
where
    T: FromStr,
    T::Err: Display,
{
    raw.parse()
        .map_err(|e: T::Err| DatabaseError::Decode(e.to_string()))
}

/// Report a database failure through the scheduling store seam
pub(crate) fn store_error(err: impl Into<DatabaseError>) -> StoreError {
    let err = err.into();
    match err.unique_violation() {
        Some(constraint) => StoreError::UniqueViolation(constraint.to_string()),
        None => StoreError::Backend(err.into()),
    }
}
