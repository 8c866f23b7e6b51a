//! Booking service enforcing one booking per student and class session

use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{SchedulingError, SchedulingResult, StoreError};
use crate::model::{
    Booking, BookingChanges, BookingDetails, BookingFilter, BookingStatus, NewBooking, Page,
    UserRole,
};
use crate::sessions::require_role;
use crate::store::{BOOKING_PAIR_CONSTRAINT, BookingStore, Directory, SessionStore};

pub const MAX_PHONE_LEN: usize = 30;
pub const MAX_SUBURB_LEN: usize = 100;

/// Digits with an optional leading `+`, spaces, dashes and parentheses
pub fn validate_phone(phone: &str) -> SchedulingResult<()> {
    let phone = phone.trim();
    if phone.is_empty() {
        return Err(SchedulingError::Validation(
            "phone number is required".to_string(),
        ));
    }
    if phone.chars().count() > MAX_PHONE_LEN {
        return Err(SchedulingError::Validation(format!(
            "phone number must be at most {} characters",
            MAX_PHONE_LEN
        )));
    }

    let body = phone.strip_prefix('+').unwrap_or(phone);
    let allowed = body
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '-' | '(' | ')'));
    if !allowed || !body.chars().any(|c| c.is_ascii_digit()) {
        return Err(SchedulingError::Validation(format!(
            "invalid phone number '{}'",
            phone
        )));
    }
    Ok(())
}

pub fn validate_suburb(suburb: &str) -> SchedulingResult<()> {
    if suburb.chars().count() > MAX_SUBURB_LEN {
        return Err(SchedulingError::Validation(format!(
            "suburb must be at most {} characters",
            MAX_SUBURB_LEN
        )));
    }
    Ok(())
}

/// Validate booking details, returning them with the phone number trimmed
/// to the form that was length-checked
fn normalize_details(details: BookingDetails) -> SchedulingResult<BookingDetails> {
    validate_phone(&details.phone_no)?;
    if let Some(suburb) = &details.suburb {
        validate_suburb(suburb)?;
    }
    Ok(BookingDetails {
        phone_no: details.phone_no.trim().to_string(),
        ..details
    })
}

/// Creates and manages bookings
#[derive(Clone)]
pub struct BookingService<B, S, D> {
    bookings: B,
    sessions: S,
    directory: D,
}

impl<B, S, D> BookingService<B, S, D>
where
    B: BookingStore,
    S: SessionStore,
    D: Directory,
{
    /// Create a new booking service
    pub fn new(bookings: B, sessions: S, directory: D) -> Self {
        Self {
            bookings,
            sessions,
            directory,
        }
    }

    /// Whether the student already holds a booking for the session, in any
    /// status
    pub async fn is_duplicate(
        &self,
        student_id: Uuid,
        class_session_id: Uuid,
    ) -> SchedulingResult<bool> {
        Ok(self
            .bookings
            .find_by_pair(student_id, class_session_id)
            .await?
            .is_some())
    }

    /// Book a class session for a student
    ///
    /// The new booking starts out `pending`.
    pub async fn create(
        &self,
        student_id: Uuid,
        class_session_id: Uuid,
        details: BookingDetails,
    ) -> SchedulingResult<Booking> {
        let details = normalize_details(details)?;
        require_role(&self.directory, student_id, UserRole::Student).await?;

        let session = self
            .sessions
            .get(class_session_id)
            .await?
            .ok_or_else(|| SchedulingError::not_found("class session", class_session_id))?;
        if !session.is_active() {
            return Err(SchedulingError::Validation(format!(
                "class session {} is cancelled",
                class_session_id
            )));
        }

        let duplicate = || SchedulingError::DuplicateBooking {
            student_id,
            class_session_id,
        };

        if self.is_duplicate(student_id, class_session_id).await? {
            warn!(%student_id, %class_session_id, "Rejected duplicate booking");
            return Err(duplicate());
        }

        let new = NewBooking {
            student_id,
            class_session_id,
            details,
            status: BookingStatus::Pending,
        };

        let booking = match self.bookings.insert(&new).await {
            Ok(booking) => booking,
            Err(StoreError::UniqueViolation(constraint))
                if constraint == BOOKING_PAIR_CONSTRAINT =>
            {
                warn!(%student_id, %class_session_id, "Concurrent duplicate booking rejected");
                return Err(duplicate());
            }
            Err(e) => return Err(e.into()),
        };

        info!(
            booking_id = %booking.id,
            %student_id,
            %class_session_id,
            "Booking created"
        );

        Ok(booking)
    }

    /// Get a booking by ID
    pub async fn get(&self, id: Uuid) -> SchedulingResult<Booking> {
        self.bookings
            .get(id)
            .await?
            .ok_or_else(|| SchedulingError::not_found("booking", id))
    }

    pub async fn list(&self, filter: &BookingFilter, page: Page) -> SchedulingResult<Vec<Booking>> {
        Ok(self.bookings.list(filter, page).await?)
    }

    /// Update contact details and remarks, leaving the status alone
    pub async fn update_details(
        &self,
        id: Uuid,
        changes: BookingChanges,
    ) -> SchedulingResult<Booking> {
        if let Some(phone) = &changes.phone_no {
            validate_phone(phone)?;
        }
        if let Some(suburb) = &changes.suburb {
            validate_suburb(suburb)?;
        }

        let mut booking = self.get(id).await?;
        if let Some(phone) = changes.phone_no {
            booking.phone_no = phone.trim().to_string();
        }
        if let Some(suburb) = changes.suburb {
            booking.suburb = Some(suburb);
        }
        if let Some(message) = changes.message {
            booking.message = message;
        }
        if let Some(remarks) = changes.remarks {
            booking.remarks = Some(remarks);
        }

        Ok(self.bookings.save(&booking).await?)
    }

    /// Move a booking to another status
    pub async fn set_status(&self, id: Uuid, status: BookingStatus) -> SchedulingResult<Booking> {
        let mut booking = self.get(id).await?;
        if booking.status == status {
            return Ok(booking);
        }
        if !booking.status.can_transition_to(status) {
            return Err(SchedulingError::Validation(format!(
                "booking cannot move from '{}' to '{}'",
                booking.status, status
            )));
        }

        let previous = booking.status;
        booking.status = status;
        let saved = self.bookings.save(&booking).await?;

        info!(booking_id = %id, from = %previous, to = %status, "Booking status changed");

        Ok(saved)
    }

    pub async fn delete(&self, id: Uuid) -> SchedulingResult<()> {
        if !self.bookings.delete(id).await? {
            return Err(SchedulingError::not_found("booking", id));
        }
        info!(booking_id = %id, "Booking deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_common_phone_formats() {
        for phone in ["0412 345 678", "+61 (2) 9876-5432", "5550100"] {
            assert!(validate_phone(phone).is_ok(), "{phone}");
        }
    }

    #[test]
    fn rejects_malformed_phone_numbers() {
        for phone in ["", "   ", "call me", "+", "12+34", "0412-345-678-0412-345-678-04123"] {
            assert!(
                matches!(validate_phone(phone), Err(SchedulingError::Validation(_))),
                "{phone}"
            );
        }
    }

    #[test]
    fn padded_phone_is_stored_trimmed() {
        let phone = format!("   {}   ", "0".repeat(MAX_PHONE_LEN));
        let details = normalize_details(BookingDetails {
            phone_no: phone,
            suburb: None,
            message: String::new(),
        })
        .unwrap();
        assert_eq!(details.phone_no, "0".repeat(MAX_PHONE_LEN));
    }

    #[test]
    fn suburb_length_is_bounded() {
        assert!(validate_suburb("Parramatta").is_ok());
        assert!(validate_suburb(&"x".repeat(MAX_SUBURB_LEN + 1)).is_err());
    }
}
