use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;

use crate::auth::require_admin;
use crate::db::queries;
use crate::errors::AppError;
use crate::models::{AuditKind, BookingStatus};
use crate::services::audit::record_audit_event;
use crate::services::bookings::change_booking_status;
use crate::state::AppState;

// GET /api/admin/bookings?q=
#[derive(Deserialize)]
pub struct BookingsQuery {
    pub q: Option<String>,
}

pub async fn list_bookings(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<BookingsQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    require_admin(state.verifier.as_ref(), &headers).await?;

    let bookings = {
        let db = state.db()?;
        queries::list_booking_details(&db, query.q.as_deref())?
    };

    Ok(Json(serde_json::json!({
        "bookings": bookings,
        "count": bookings.len(),
    })))
}

// GET /api/admin/bookings/:id
pub async fn get_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    require_admin(state.verifier.as_ref(), &headers).await?;

    let booking = {
        let db = state.db()?;
        queries::get_booking_details(&db, &id)?
    }
    .ok_or_else(|| AppError::NotFound(format!("booking {id}")))?;

    Ok(Json(serde_json::json!({ "booking": booking })))
}

// PATCH /api/admin/bookings
#[derive(Deserialize)]
pub struct UpdateBookingRequest {
    #[serde(alias = "bookingId")]
    pub booking_id: Option<String>,
    pub status: Option<String>,
}

pub async fn update_booking_status(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<UpdateBookingRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let principal = require_admin(state.verifier.as_ref(), &headers).await?;

    let booking_id = body
        .booking_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::Validation("booking_id is required".to_string()))?;
    let status = body
        .status
        .map(|s| BookingStatus::parse(&s))
        .ok_or_else(|| AppError::Validation("status is required".to_string()))?;

    let (previous, booking) = {
        let db = state.db()?;
        change_booking_status(&db, &booking_id, status)?
    };

    record_audit_event(
        &state,
        &principal,
        "booking.status",
        AuditKind::Update,
        &format!(
            "booking {booking_id}: {} -> {}",
            previous.as_str(),
            booking.booking.status.as_str()
        ),
    );

    Ok(Json(serde_json::json!({ "booking": booking })))
}
