use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::errors::AppError;
use crate::models::{Booking, ServiceType};
use crate::services::validation::{validate_booking, BookingForm};
use crate::state::AppState;

// POST /api/bookings
pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    Json(form): Json<BookingForm>,
) -> Result<(StatusCode, Json<Booking>), AppError> {
    // Rejected forms never reach the store
    let input = validate_booking(form).map_err(AppError::Validation)?;
    let booking = state.bookings.create_booking(input).await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

// GET /api/services
pub async fn list_services() -> Json<Vec<&'static str>> {
    Json(ServiceType::ALL.iter().map(|s| s.as_str()).collect())
}
