pub mod aggregation;
pub mod audit;
pub mod bookings;
pub mod hotels;
pub mod moderation;
pub mod users;
