pub mod bookings;
pub mod health;
pub mod hotels;
pub mod logs;
pub mod stats;
pub mod users;

use std::sync::Arc;

use axum::routing::{get, patch};
use axum::Router;

use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route(
            "/api/admin/hotels",
            get(hotels::list_hotels).post(hotels::create_hotel),
        )
        .route("/api/admin/hotels/:id", get(hotels::get_hotel))
        .route("/api/admin/hotels/:id/approve", patch(hotels::approve_hotel))
        .route("/api/admin/hotels/:id/reject", patch(hotels::reject_hotel))
        .route(
            "/api/admin/bookings",
            get(bookings::list_bookings).patch(bookings::update_booking_status),
        )
        .route("/api/admin/bookings/:id", get(bookings::get_booking))
        .route(
            "/api/admin/users",
            get(users::list_users).delete(users::delete_user),
        )
        .route(
            "/api/admin/users/:id",
            get(users::get_user).patch(users::update_user),
        )
        .route("/api/admin/stats", get(stats::get_stats))
        .route("/api/admin/stats/report", get(stats::get_report))
        .route("/api/admin/logs", get(logs::list_logs))
        .route("/api/admin/logs/events", get(logs::events_stream))
        .with_state(state)
}
