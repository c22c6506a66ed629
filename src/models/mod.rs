pub mod audit;
pub mod booking;
pub mod hotel;
pub mod user;

pub use audit::{AuditEvent, AuditKind};
pub use booking::{Booking, BookingDetails, BookingStatus};
pub use hotel::{Hotel, HotelStatus, HotelWithOwner, OwnerSummary, StatusFilter};
pub use user::{Role, User, UserSummary};
