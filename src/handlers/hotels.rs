use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::Deserialize;

use crate::auth::require_admin;
use crate::db::queries;
use crate::errors::AppError;
use crate::models::{AuditKind, StatusFilter};
use crate::services::audit::record_audit_event;
use crate::services::hotels::{self, NewHotel};
use crate::services::moderation;
use crate::state::AppState;

// GET /api/admin/hotels?status=PENDING|ACTIVE|INACTIVE|all
#[derive(Deserialize)]
pub struct HotelsQuery {
    pub status: Option<String>,
}

pub async fn list_hotels(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<HotelsQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    require_admin(state.verifier.as_ref(), &headers).await?;

    let token = query.status.as_deref().unwrap_or("all");
    let filter = StatusFilter::parse(token)
        .ok_or_else(|| AppError::Validation(format!("unknown status filter: {token}")))?;

    let hotels = {
        let db = state.db()?;
        queries::list_hotels(&db, filter)?
    };

    Ok(Json(serde_json::json!({
        "hotels": hotels,
        "count": hotels.len(),
    })))
}

// GET /api/admin/hotels/:id
pub async fn get_hotel(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    require_admin(state.verifier.as_ref(), &headers).await?;

    let hotel = {
        let db = state.db()?;
        queries::get_hotel_with_owner(&db, &id)?
    }
    .ok_or_else(|| AppError::NotFound(format!("hotel {id}")))?;

    Ok(Json(serde_json::json!({ "hotel": hotel })))
}

// POST /api/admin/hotels
pub async fn create_hotel(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<NewHotel>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    let principal = require_admin(state.verifier.as_ref(), &headers).await?;

    let hotel = {
        let db = state.db()?;
        hotels::create_hotel(&db, &principal, body)?
    };

    record_audit_event(
        &state,
        &principal,
        "hotel.create",
        AuditKind::Create,
        &format!("created hotel {} ({})", hotel.name, hotel.id),
    );

    Ok((StatusCode::CREATED, Json(serde_json::json!({ "hotel": hotel }))))
}

// PATCH /api/admin/hotels/:id/approve
pub async fn approve_hotel(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let principal = require_admin(state.verifier.as_ref(), &headers).await?;

    let hotel = {
        let db = state.db()?;
        moderation::approve_hotel(&db, &principal, &id)?
    };

    record_audit_event(
        &state,
        &principal,
        "hotel.approve",
        AuditKind::Update,
        &format!("approved hotel {} ({})", hotel.name, hotel.id),
    );

    Ok(Json(serde_json::json!({
        "message": "hotel approved",
        "hotel": hotel,
    })))
}

// PATCH /api/admin/hotels/:id/reject
#[derive(Debug, Deserialize, Default)]
pub struct RejectRequest {
    pub reason: Option<String>,
}

impl RejectRequest {
    /// An empty body means no reason. Anything else must be a valid request.
    fn from_body(body: &[u8]) -> Result<Self, AppError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_json::from_slice(body)
            .map_err(|e| AppError::Validation(format!("invalid reject body: {e}")))
    }
}

pub async fn reject_hotel(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<serde_json::Value>, AppError> {
    let principal = require_admin(state.verifier.as_ref(), &headers).await?;
    let reason = RejectRequest::from_body(&body)?.reason;

    let hotel = {
        let db = state.db()?;
        moderation::reject_hotel(&db, &principal, &id, reason)?
    };

    record_audit_event(
        &state,
        &principal,
        "hotel.reject",
        AuditKind::Update,
        &format!(
            "rejected hotel {} ({}): {}",
            hotel.name,
            hotel.id,
            hotel.rejection_reason.as_deref().unwrap_or_default()
        ),
    );

    Ok(Json(serde_json::json!({
        "message": "hotel rejected",
        "hotel": hotel,
    })))
}
