pub mod application;
pub mod booking;
pub mod job;

pub use application::{JobApplication, NewApplication};
pub use booking::{generate_order_id, Booking, BookingStatus, NewBooking, ServiceType};
pub use job::{EmploymentType, JobOpening, NewJob};

/// Milliseconds since the Unix epoch, the timestamp unit stored on every document.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
