use chrono::Utc;
use rusqlite::Connection;
use serde::Deserialize;

use crate::auth::Principal;
use crate::db::queries;
use crate::errors::AppError;
use crate::models::{Hotel, HotelStatus};

#[derive(Debug, Default, Deserialize)]
pub struct NewHotel {
    pub name: Option<String>,
    pub description: Option<String>,
    pub city: Option<String>,
    pub address: Option<String>,
    pub country: Option<String>,
    pub price_per_night: Option<f64>,
    pub owner_id: Option<String>,
}

fn required(value: Option<String>, field: &str) -> Result<String, AppError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::Validation(format!("{field} is required")))
}

fn optional(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Creates a listing awaiting moderation. The owner defaults to the caller.
pub fn create_hotel(conn: &Connection, principal: &Principal, input: NewHotel) -> Result<Hotel, AppError> {
    let name = required(input.name, "name")?;
    let city = required(input.city, "city")?;
    let price_per_night = input
        .price_per_night
        .ok_or_else(|| AppError::Validation("price_per_night is required".to_string()))?;
    if !price_per_night.is_finite() || price_per_night < 0.0 {
        return Err(AppError::Validation(
            "price_per_night must be a non-negative number".to_string(),
        ));
    }

    let owner_id = optional(input.owner_id).unwrap_or_else(|| principal.user_id.clone());
    if queries::get_user(conn, &owner_id)?.is_none() {
        return Err(AppError::NotFound(format!("owner {owner_id}")));
    }

    let now = Utc::now().naive_utc();
    let hotel = Hotel {
        id: uuid::Uuid::new_v4().to_string(),
        owner_id,
        name,
        description: optional(input.description),
        city,
        address: optional(input.address),
        country: optional(input.country),
        price_per_night,
        rating: 0.0,
        status: HotelStatus::Pending,
        rejection_reason: None,
        created_at: now,
        updated_at: now,
    };
    queries::create_hotel(conn, &hotel)?;

    tracing::info!(hotel_id = %hotel.id, owner_id = %hotel.owner_id, "hotel created");
    Ok(hotel)
}
