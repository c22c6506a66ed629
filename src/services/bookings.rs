use rusqlite::Connection;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{BookingDetails, BookingStatus};

/// Moves a booking along its lifecycle. Only PENDING → CONFIRMED →
/// COMPLETED and PENDING/CONFIRMED → CANCELLED are allowed.
pub fn change_booking_status(
    conn: &Connection,
    booking_id: &str,
    next: BookingStatus,
) -> Result<(BookingStatus, BookingDetails), AppError> {
    if let BookingStatus::Unrecognized(raw) = &next {
        return Err(AppError::Validation(format!("unknown booking status: {raw}")));
    }

    let current = queries::get_booking_details(conn, booking_id)?
        .ok_or_else(|| AppError::NotFound(format!("booking {booking_id}")))?
        .booking
        .status;

    if !current.can_transition_to(&next) {
        return Err(AppError::Validation(format!(
            "cannot move booking from {} to {}",
            current.as_str(),
            next.as_str()
        )));
    }

    if !queries::update_booking_status(conn, booking_id, &current, &next)? {
        return Err(AppError::Validation(format!(
            "booking {booking_id} changed status concurrently"
        )));
    }

    let updated = queries::get_booking_details(conn, booking_id)?
        .ok_or_else(|| AppError::NotFound(format!("booking {booking_id}")))?;
    Ok((current, updated))
}
