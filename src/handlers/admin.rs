use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::sse::{Event, Sse};
use axum::Json;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_stream::wrappers::{IntervalStream, UnboundedReceiverStream};
use tokio_stream::StreamExt;

use crate::errors::AppError;
use crate::models::{Booking, BookingStatus, JobApplication, JobOpening, NewJob};
use crate::services::bookings::{BookingFilter, DashboardStats};
use crate::services::validation::validate_job;
use crate::state::AppState;

fn bearer_token(headers: &HeaderMap) -> &str {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .unwrap_or("")
}

fn check_auth(headers: &HeaderMap, state: &AppState) -> Result<(), AppError> {
    if state.sessions.is_valid(bearer_token(headers)) {
        Ok(())
    } else {
        Err(AppError::Unauthorized)
    }
}

// POST /api/admin/login
#[derive(Deserialize)]
pub struct LoginRequest {
    pub passphrase: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    token: String,
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let token = state
        .sessions
        .login(&body.passphrase, &state.config.admin_passphrase)
        .ok_or(AppError::Unauthorized)?;
    Ok(Json(LoginResponse { token }))
}

// POST /api/admin/logout
pub async fn logout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, AppError> {
    if !state.sessions.logout(bearer_token(&headers)) {
        return Err(AppError::Unauthorized);
    }
    Ok(Json(serde_json::json!({ "ok": true })))
}

// GET /api/admin/bookings
#[derive(Deserialize)]
pub struct BookingsQuery {
    pub status: Option<String>,
    pub q: Option<String>,
}

impl BookingsQuery {
    fn filter(&self) -> Result<BookingFilter, AppError> {
        let status = match self.status.as_deref() {
            None | Some("") | Some("All") | Some("all") => None,
            Some(s) => Some(
                BookingStatus::parse(s)
                    .ok_or_else(|| AppError::BadRequest(format!("unknown status: {s}")))?,
            ),
        };
        Ok(BookingFilter {
            status,
            search: self.q.clone(),
        })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRow {
    #[serde(flatten)]
    booking: Booking,
    tel_link: String,
    whatsapp_link: Option<String>,
}

impl From<&Booking> for BookingRow {
    fn from(b: &Booking) -> Self {
        Self {
            tel_link: b.tel_link(),
            whatsapp_link: b.whatsapp_link(),
            booking: b.clone(),
        }
    }
}

#[derive(Serialize)]
pub struct BookingsResponse {
    stats: DashboardStats,
    bookings: Vec<BookingRow>,
}

pub async fn get_bookings(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<BookingsQuery>,
) -> Result<Json<BookingsResponse>, AppError> {
    check_auth(&headers, &state)?;

    let filter = query.filter()?;
    let bookings = state.bookings.list_bookings().await?;

    Ok(Json(BookingsResponse {
        stats: DashboardStats::from_bookings(&bookings),
        bookings: filter.apply(&bookings).into_iter().map(BookingRow::from).collect(),
    }))
}

// POST /api/admin/bookings/:id/status
#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: BookingStatus,
}

pub async fn update_booking_status(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<UpdateStatusRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    check_auth(&headers, &state)?;

    state.bookings.update_booking_status(&id, body.status).await?;
    Ok(Json(serde_json::json!({ "ok": true, "status": body.status })))
}

// GET /api/admin/bookings/events (SSE stream of full snapshots)
#[derive(Deserialize)]
pub struct EventsQuery {
    pub token: Option<String>,
}

pub async fn booking_events(
    State(state): State<Arc<AppState>>,
    Query(query): Query<EventsQuery>,
) -> Result<Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>>>, AppError> {
    // Auth via query param (EventSource can't set headers)
    if !state.sessions.is_valid(query.token.as_deref().unwrap_or("")) {
        return Err(AppError::Unauthorized);
    }

    let (tx, rx) = mpsc::unbounded_channel();
    let subscription = state
        .bookings
        .subscribe_to_bookings(move |bookings| {
            let _ = tx.send(bookings);
        })
        .await?;

    // The stream owns the subscription, so a client disconnect releases it
    let snapshots = UnboundedReceiverStream::new(rx).map(move |bookings| {
        let _live = &subscription;
        let rows: Vec<BookingRow> = bookings.iter().map(BookingRow::from).collect();
        let data = serde_json::to_string(&rows).unwrap_or_default();
        Ok::<_, Infallible>(Event::default().data(data).event("bookings"))
    });

    let keepalive = IntervalStream::new(tokio::time::interval(Duration::from_secs(30)))
        .map(|_| Ok::<_, Infallible>(Event::default().comment("keepalive")));

    Ok(Sse::new(snapshots.merge(keepalive)))
}

// GET /api/admin/jobs
pub async fn list_jobs(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<JobOpening>>, AppError> {
    check_auth(&headers, &state)?;
    Ok(Json(state.careers.list_jobs().await?))
}

// POST /api/admin/jobs
pub async fn create_job(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<NewJob>,
) -> Result<(StatusCode, Json<JobOpening>), AppError> {
    check_auth(&headers, &state)?;

    let input = validate_job(body).map_err(AppError::Validation)?;
    let job = state.careers.create_job(input).await?;
    Ok((StatusCode::CREATED, Json(job)))
}

// DELETE /api/admin/jobs/:id
pub async fn delete_job(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    check_auth(&headers, &state)?;

    state.careers.delete_job(&id).await?;
    Ok(Json(serde_json::json!({ "ok": true })))
}

// GET /api/admin/applications
pub async fn list_applications(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<JobApplication>>, AppError> {
    check_auth(&headers, &state)?;
    Ok(Json(state.careers.list_applications().await?))
}
