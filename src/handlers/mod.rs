pub mod admin;
pub mod bookings;
pub mod careers;
pub mod health;
