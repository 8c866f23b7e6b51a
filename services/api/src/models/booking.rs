//! Booking request payloads
//!
//! The booking itself is [`scheduling::model::Booking`].

use scheduling::model::{BookingChanges, BookingDetails, BookingFilter, BookingStatus};
use serde::Deserialize;
use uuid::Uuid;

/// Request for booking a class session
#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    pub student_id: Uuid,
    pub class_session_id: Uuid,
    pub phone_no: String,
    pub suburb: Option<String>,
    #[serde(default)]
    pub message: String,
}

impl CreateBookingRequest {
    pub fn details(&self) -> BookingDetails {
        BookingDetails {
            phone_no: self.phone_no.clone(),
            suburb: self.suburb.clone(),
            message: self.message.clone(),
        }
    }
}

/// Partial update of a booking's contact details
#[derive(Debug, Default, Deserialize)]
pub struct UpdateBookingRequest {
    pub phone_no: Option<String>,
    pub suburb: Option<String>,
    pub message: Option<String>,
    pub remarks: Option<String>,
}

impl From<UpdateBookingRequest> for BookingChanges {
    fn from(request: UpdateBookingRequest) -> Self {
        BookingChanges {
            phone_no: request.phone_no,
            suburb: request.suburb,
            message: request.message,
            remarks: request.remarks,
        }
    }
}

/// Request for moving a booking to another status
#[derive(Debug, Deserialize)]
pub struct BookingStatusRequest {
    pub status: BookingStatus,
}

/// Filters for listing bookings
#[derive(Debug, Default, Deserialize)]
pub struct BookingQuery {
    pub student_id: Option<Uuid>,
    pub class_session_id: Option<Uuid>,
    pub status: Option<BookingStatus>,
}

impl From<BookingQuery> for BookingFilter {
    fn from(query: BookingQuery) -> Self {
        BookingFilter {
            student_id: query.student_id,
            class_session_id: query.class_session_id,
            status: query.status,
        }
    }
}
