use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hotel {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub description: Option<String>,
    pub city: String,
    pub address: Option<String>,
    pub country: Option<String>,
    pub price_per_night: f64,
    pub rating: f64,
    pub status: HotelStatus,
    pub rejection_reason: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize)]
pub struct OwnerSummary {
    pub id: String,
    pub name: String,
    pub email: String,
}

/// A hotel as shown in admin listings, with its owner inlined.
#[derive(Debug, Clone, Serialize)]
pub struct HotelWithOwner {
    #[serde(flatten)]
    pub hotel: Hotel,
    pub owner: OwnerSummary,
}

/// Canonical moderation status of a listing.
///
/// Older rows may carry `PENDING_REVIEW`, `APPROVED` or `REJECTED`; those are
/// folded into the canonical variants by [`HotelStatus::parse`] and never
/// written back.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum HotelStatus {
    Pending,
    Active,
    Inactive,
}

impl HotelStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HotelStatus::Pending => "PENDING",
            HotelStatus::Active => "ACTIVE",
            HotelStatus::Inactive => "INACTIVE",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PENDING" | "PENDING_REVIEW" => Some(HotelStatus::Pending),
            "ACTIVE" | "APPROVED" => Some(HotelStatus::Active),
            "INACTIVE" | "REJECTED" => Some(HotelStatus::Inactive),
            _ => None,
        }
    }

    /// Every stored spelling that maps onto this status, canonical first.
    pub fn spellings(&self) -> &'static [&'static str] {
        match self {
            HotelStatus::Pending => &["PENDING", "PENDING_REVIEW"],
            HotelStatus::Active => &["ACTIVE", "APPROVED"],
            HotelStatus::Inactive => &["INACTIVE", "REJECTED"],
        }
    }
}

/// Status filter accepted by the hotel listing endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    All,
    Only(HotelStatus),
}

impl StatusFilter {
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "all" => Some(StatusFilter::All),
            "PENDING" => Some(StatusFilter::Only(HotelStatus::Pending)),
            "ACTIVE" => Some(StatusFilter::Only(HotelStatus::Active)),
            "INACTIVE" => Some(StatusFilter::Only(HotelStatus::Inactive)),
            _ => None,
        }
    }
}
