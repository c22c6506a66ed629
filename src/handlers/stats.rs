use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;

use crate::auth::require_admin;
use crate::db::queries;
use crate::errors::AppError;
use crate::services::aggregation::{self, StatsReport};
use crate::state::AppState;

// GET /api/admin/stats
pub async fn get_stats(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, AppError> {
    require_admin(state.verifier.as_ref(), &headers).await?;

    let totals = {
        let db = state.db()?;
        queries::get_platform_totals(&db)?
    };

    Ok(Json(serde_json::json!({ "stats": totals })))
}

// GET /api/admin/stats/report
pub async fn get_report(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<StatsReport>, AppError> {
    require_admin(state.verifier.as_ref(), &headers).await?;

    // Snapshot under the lock, aggregate outside it
    let (bookings, totals) = {
        let db = state.db()?;
        (queries::list_bookings(&db)?, queries::get_platform_totals(&db)?)
    };

    Ok(Json(aggregation::build_report(&bookings, &totals)))
}
