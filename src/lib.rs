pub mod config;
pub mod db;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod services;
pub mod state;

use std::sync::Arc;

use axum::routing::{delete, get, post};
use axum::Router;

use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/api/services", get(handlers::bookings::list_services))
        .route("/api/bookings", post(handlers::bookings::create_booking))
        .route("/api/jobs", get(handlers::careers::list_jobs))
        .route("/api/jobs/:id/apply", post(handlers::careers::apply))
        .route("/api/admin/login", post(handlers::admin::login))
        .route("/api/admin/logout", post(handlers::admin::logout))
        .route("/api/admin/bookings", get(handlers::admin::get_bookings))
        .route(
            "/api/admin/bookings/events",
            get(handlers::admin::booking_events),
        )
        .route(
            "/api/admin/bookings/:id/status",
            post(handlers::admin::update_booking_status),
        )
        .route(
            "/api/admin/jobs",
            get(handlers::admin::list_jobs).post(handlers::admin::create_job),
        )
        .route("/api/admin/jobs/:id", delete(handlers::admin::delete_job))
        .route(
            "/api/admin/applications",
            get(handlers::admin::list_applications),
        )
        .with_state(state)
}
