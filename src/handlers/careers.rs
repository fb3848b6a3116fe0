use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::errors::AppError;
use crate::models::JobOpening;
use crate::services::validation::{validate_application, ApplicationForm};
use crate::state::AppState;

// GET /api/jobs
pub async fn list_jobs(State(state): State<Arc<AppState>>) -> Json<Vec<JobOpening>> {
    Json(state.careers.get_jobs().await)
}

// POST /api/jobs/:id/apply
pub async fn apply(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<String>,
    Json(form): Json<ApplicationForm>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    let job = state
        .careers
        .get_job(&job_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("job {job_id}")))?;

    let application = validate_application(form, &job).map_err(AppError::Validation)?;
    state.careers.submit_application(application).await?;

    Ok((StatusCode::CREATED, Json(serde_json::json!({ "ok": true }))))
}
