pub mod bookings;
pub mod careers;
pub mod notification;
pub mod session;
pub mod validation;
