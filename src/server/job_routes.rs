//! Job HTTP routes: status reads and user-initiated cancellation.
//!
//! Jobs are addressed by their UUID, not the row id.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

use crate::server::session::Session;
use crate::server::state::{GuardedTrackStore, ServerState};
use crate::transform::TransformManager;

/// GET / - the caller's jobs, newest first
async fn list_jobs(session: Session, State(store): State<GuardedTrackStore>) -> Response {
    match store.list_jobs(session.user_id) {
        Ok(jobs) => Json(jobs).into_response(),
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

/// GET /active - queued and processing jobs only
async fn list_active_jobs(session: Session, State(store): State<GuardedTrackStore>) -> Response {
    match store.list_active_jobs(session.user_id) {
        Ok(jobs) => Json(jobs).into_response(),
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

/// GET /{job_id}
async fn get_job(
    session: Session,
    State(store): State<GuardedTrackStore>,
    Path(job_id): Path<String>,
) -> Response {
    match store.get_job(session.user_id, &job_id) {
        Ok(Some(job)) => Json(job).into_response(),
        Ok(None) => StatusCode::NOT_FOUND.into_response(),
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

/// POST /{job_id}/cancel
async fn cancel_job(
    session: Session,
    State(manager): State<TransformManager>,
    Path(job_id): Path<String>,
) -> Response {
    match manager.cancel_job(session.user_id, &job_id) {
        Ok(job) => Json(job).into_response(),
        Err(e) => e.into_response(),
    }
}

pub fn make_job_routes(state: ServerState) -> Router {
    Router::new()
        .route("/", get(list_jobs))
        .route("/active", get(list_active_jobs))
        .route("/{job_id}", get(get_job))
        .route("/{job_id}/cancel", post(cancel_job))
        .with_state(state)
}
