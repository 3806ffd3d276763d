//! Transformation HTTP routes: read-only listing plus the download gate.

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;

use crate::server::session::Session;
use crate::server::state::{GuardedTrackStore, ServerState};
use crate::server::ServerConfig;
use crate::transform::TransformManager;

#[derive(Debug, Serialize)]
struct DownloadResponse {
    download_url: String,
}

/// GET / - the caller's transformations across all their tracks
async fn list_transformations(
    session: Session,
    State(store): State<GuardedTrackStore>,
) -> Response {
    match store.list_transformations(session.user_id) {
        Ok(transformations) => Json(transformations).into_response(),
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

/// GET /{id}
async fn get_transformation(
    session: Session,
    State(store): State<GuardedTrackStore>,
    Path(id): Path<i64>,
) -> Response {
    match store.get_transformation(session.user_id, id) {
        Ok(Some(transformation)) => Json(transformation).into_response(),
        Ok(None) => StatusCode::NOT_FOUND.into_response(),
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

/// GET /{id}/download - releases the output reference only once completed.
/// The returned URL is absolute, built from the request's Host header.
async fn download_transformation(
    session: Session,
    State(manager): State<TransformManager>,
    State(config): State<ServerConfig>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    match manager.download_path(session.user_id, id) {
        Ok(path) => {
            let host = headers
                .get(header::HOST)
                .and_then(|v| v.to_str().ok())
                .map(|s| s.to_string())
                .unwrap_or_else(|| format!("127.0.0.1:{}", config.port));
            let download_url = format!("http://{}{}", host, path);
            Json(DownloadResponse { download_url }).into_response()
        }
        Err(e) => e.into_response(),
    }
}

pub fn make_transform_routes(state: ServerState) -> Router {
    Router::new()
        .route("/", get(list_transformations))
        .route("/{id}", get(get_transformation))
        .route("/{id}/download", get(download_transformation))
        .with_state(state)
}
