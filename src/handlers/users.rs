use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;

use crate::auth::require_admin;
use crate::db::queries;
use crate::errors::AppError;
use crate::models::AuditKind;
use crate::services::audit::record_audit_event;
use crate::services::users::{self, UserPatch};
use crate::state::AppState;

// GET /api/admin/users?q=
#[derive(Deserialize)]
pub struct UsersQuery {
    pub q: Option<String>,
}

pub async fn list_users(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<UsersQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let principal = require_admin(state.verifier.as_ref(), &headers).await?;

    let users = {
        let db = state.db()?;
        queries::list_users(&db, query.q.as_deref())?
    };

    tracing::debug!(admin = %principal.email, count = users.len(), "listed users");
    Ok(Json(serde_json::json!({
        "users": users,
        "count": users.len(),
    })))
}

// GET /api/admin/users/:id
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    require_admin(state.verifier.as_ref(), &headers).await?;

    let (user, bookings) = {
        let db = state.db()?;
        let user = queries::get_user(&db, &id)?
            .ok_or_else(|| AppError::NotFound(format!("user {id}")))?;
        (user, queries::list_bookings_for_user(&db, &id)?)
    };

    Ok(Json(serde_json::json!({
        "user": user,
        "bookings": bookings,
    })))
}

// PATCH /api/admin/users/:id
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<UserPatch>,
) -> Result<Json<serde_json::Value>, AppError> {
    let principal = require_admin(state.verifier.as_ref(), &headers).await?;

    let user = {
        let db = state.db()?;
        users::update_user(&db, &id, body)?
    };

    record_audit_event(
        &state,
        &principal,
        "user.update",
        AuditKind::Update,
        &format!("updated user {} ({})", user.email, user.id),
    );

    Ok(Json(serde_json::json!({ "user": user })))
}

// DELETE /api/admin/users
#[derive(Deserialize)]
pub struct DeleteUserRequest {
    #[serde(alias = "userId")]
    pub user_id: Option<String>,
}

pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<DeleteUserRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let principal = require_admin(state.verifier.as_ref(), &headers).await?;

    let user_id = body
        .user_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::Validation("user_id is required".to_string()))?;

    let (user, removed_bookings) = {
        let db = state.db()?;
        users::delete_user(&db, &user_id)?
    };

    record_audit_event(
        &state,
        &principal,
        "user.delete",
        AuditKind::Delete,
        &format!(
            "deleted user {} ({}) and {removed_bookings} booking(s)",
            user.email, user.id
        ),
    );

    Ok(Json(serde_json::json!({
        "ok": true,
        "removed_bookings": removed_bookings,
    })))
}
