//! Hotel listing moderation.
//!
//! A listing starts in `PENDING` and an administrator moves it to `ACTIVE`
//! (approve) or `INACTIVE` (reject). Neither action checks the prior status,
//! so repeating one is harmless and an approved hotel can later be rejected
//! or the other way round. Moving a listing back to `PENDING` is left to the
//! owner-facing resubmission flow.

use rusqlite::Connection;

use crate::auth::Principal;
use crate::db::queries;
use crate::errors::AppError;
use crate::models::{Hotel, HotelStatus};

pub const DEFAULT_REJECTION_REASON: &str = "Non conforme";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModerationAction {
    Approve,
    Reject { reason: Option<String> },
}

/// Status and rejection reason a hotel ends up with after `action`.
pub fn transition(action: &ModerationAction) -> (HotelStatus, Option<String>) {
    match action {
        ModerationAction::Approve => (HotelStatus::Active, None),
        ModerationAction::Reject { reason } => {
            let reason = reason
                .as_deref()
                .filter(|r| !r.trim().is_empty())
                .unwrap_or(DEFAULT_REJECTION_REASON);
            (HotelStatus::Inactive, Some(reason.to_string()))
        }
    }
}

/// Applies `action` to one hotel. Status and reason are written by a single
/// statement, so a failure leaves the row untouched.
pub fn moderate_hotel(
    conn: &Connection,
    principal: &Principal,
    hotel_id: &str,
    action: &ModerationAction,
) -> Result<Hotel, AppError> {
    if !principal.is_admin() {
        return Err(AppError::Forbidden("admin role required".to_string()));
    }

    let (status, reason) = transition(action);
    let hotel = queries::update_hotel_status(conn, hotel_id, status, reason.as_deref())?
        .ok_or_else(|| AppError::NotFound(format!("hotel {hotel_id}")))?;

    tracing::info!(
        hotel_id,
        status = status.as_str(),
        admin = %principal.email,
        "hotel moderated"
    );
    Ok(hotel)
}

pub fn approve_hotel(conn: &Connection, principal: &Principal, hotel_id: &str) -> Result<Hotel, AppError> {
    moderate_hotel(conn, principal, hotel_id, &ModerationAction::Approve)
}

pub fn reject_hotel(
    conn: &Connection,
    principal: &Principal,
    hotel_id: &str,
    reason: Option<String>,
) -> Result<Hotel, AppError> {
    moderate_hotel(conn, principal, hotel_id, &ModerationAction::Reject { reason })
}
