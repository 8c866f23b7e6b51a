//! Class-session scheduling and booking rules for the driving school
//!
//! Two rules live here and nowhere else:
//!
//! - an instructor never has two active sessions whose
//!   `[start, start + duration)` windows overlap ([`conflict`], enforced by
//!   [`ClassSessionService`]);
//! - a student holds at most one booking per class session
//!   ([`BookingService`]).
//!
//! Persistence is abstracted behind the traits in [`store`]. The HTTP
//! service implements them over PostgreSQL; [`memory::MemoryStore`] keeps
//! everything in process.

pub mod bookings;
pub mod conflict;
pub mod error;
pub mod memory;
pub mod model;
pub mod sessions;
pub mod store;

pub use bookings::BookingService;
pub use conflict::{ConflictResult, TimeWindow};
pub use error::{SchedulingError, SchedulingResult, StoreError, StoreResult};
pub use sessions::ClassSessionService;
