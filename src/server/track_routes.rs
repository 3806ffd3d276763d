//! Track HTTP routes.
//!
//! Upload, CRUD, search and the transformation request endpoint.

use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, Multipart, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::media::{file_size_mb, MediaError, MAX_UPLOAD_BYTES};
use crate::server::session::Session;
use crate::server::state::{GuardedMediaStorage, GuardedTrackStore, ServerState};
use crate::transform::{TransformManager, TransformRequest};

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

#[derive(Debug, Deserialize)]
struct RenameBody {
    name: String,
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    q: String,
}

const SEARCH_RESULT_LIMIT: usize = 10;

/// POST / - upload a track (multipart/form-data with "file" and optional "name")
async fn upload_track(
    session: Session,
    State(store): State<GuardedTrackStore>,
    State(media): State<GuardedMediaStorage>,
    mut multipart: Multipart,
) -> Response {
    let mut filename: Option<String> = None;
    let mut content_type: Option<String> = None;
    let mut data: Option<Vec<u8>> = None;
    let mut name: Option<String> = None;

    while let Ok(Some(field)) = multipart.next_field().await {
        let field_name = field.name().unwrap_or("").to_string();
        match field_name.as_str() {
            "file" => {
                filename = field.file_name().map(|s| s.to_string());
                content_type = field.content_type().map(|s| s.to_string());
                match field.bytes().await {
                    Ok(bytes) => data = Some(bytes.to_vec()),
                    Err(e) => {
                        warn!("Failed to read file data: {}", e);
                        return error_response(StatusCode::BAD_REQUEST, "Failed to read file");
                    }
                }
            }
            "name" => {
                if let Ok(bytes) = field.bytes().await {
                    let value = String::from_utf8_lossy(&bytes).trim().to_string();
                    if !value.is_empty() {
                        name = Some(value);
                    }
                }
            }
            _ => {}
        }
    }

    let data = match data {
        Some(data) => data,
        None => return error_response(StatusCode::BAD_REQUEST, "No file provided"),
    };
    let filename = match filename {
        Some(filename) => filename,
        None => return error_response(StatusCode::BAD_REQUEST, "No filename provided"),
    };
    let content_type = content_type.unwrap_or_default();

    if let Err(e) = media.validate_upload(&content_type, &data) {
        return error_response(StatusCode::BAD_REQUEST, e.to_string());
    }

    let relative_path = match media.save_original(&filename, &data).await {
        Ok(path) => path,
        Err(MediaError::InvalidFilename(f)) => {
            return error_response(StatusCode::BAD_REQUEST, format!("Invalid filename: {}", f))
        }
        Err(e) => {
            warn!("Failed to store upload: {}", e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "internal error");
        }
    };

    // Fall back to the filename without extension
    let name = name.unwrap_or_else(|| {
        std::path::Path::new(&filename)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| filename.clone())
    });

    match store.create_track(
        session.user_id,
        &name,
        &relative_path,
        0.0,
        file_size_mb(data.len() as u64),
    ) {
        Ok(track) => {
            info!(
                user_id = session.user_id,
                track_id = track.id,
                "Track uploaded"
            );
            (StatusCode::CREATED, Json(track)).into_response()
        }
        Err(e) => {
            warn!("Failed to create track row: {:#}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
        }
    }
}

/// GET / - list the caller's tracks
async fn list_tracks(session: Session, State(store): State<GuardedTrackStore>) -> Response {
    match store.list_tracks(session.user_id) {
        Ok(tracks) => Json(tracks).into_response(),
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

/// GET /{id}
async fn get_track(
    session: Session,
    State(store): State<GuardedTrackStore>,
    Path(id): Path<i64>,
) -> Response {
    match store.get_track(session.user_id, id) {
        Ok(Some(track)) => Json(track).into_response(),
        Ok(None) => StatusCode::NOT_FOUND.into_response(),
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

/// PUT /{id} - rename only
async fn rename_track(
    session: Session,
    State(store): State<GuardedTrackStore>,
    Path(id): Path<i64>,
    Json(body): Json<RenameBody>,
) -> Response {
    if body.name.trim().is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "name must not be empty");
    }
    match store.rename_track(session.user_id, id, body.name.trim()) {
        Ok(true) => match store.get_track(session.user_id, id) {
            Ok(Some(track)) => Json(track).into_response(),
            _ => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        },
        Ok(false) => StatusCode::NOT_FOUND.into_response(),
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

/// DELETE /{id} - cascades to transformations and jobs
async fn delete_track(
    session: Session,
    State(store): State<GuardedTrackStore>,
    State(media): State<GuardedMediaStorage>,
    Path(id): Path<i64>,
) -> Response {
    let track = match store.get_track(session.user_id, id) {
        Ok(Some(track)) => track,
        Ok(None) => return StatusCode::NOT_FOUND.into_response(),
        Err(_) => return StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    };
    match store.delete_track(session.user_id, id) {
        Ok(true) => {
            if let Err(e) = media.remove(&track.file_path).await {
                warn!("Failed to remove stored file {}: {}", track.file_path, e);
            }
            StatusCode::NO_CONTENT.into_response()
        }
        Ok(false) => StatusCode::NOT_FOUND.into_response(),
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

/// GET /search?q= - name substring match, empty query returns []
async fn search_tracks(
    session: Session,
    State(store): State<GuardedTrackStore>,
    Query(query): Query<SearchQuery>,
) -> Response {
    let q = query.q.trim();
    if q.is_empty() {
        return Json(Vec::<crate::transform::Track>::new()).into_response();
    }
    match store.search_tracks(session.user_id, q, SEARCH_RESULT_LIMIT) {
        Ok(tracks) => Json(tracks).into_response(),
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

/// POST /{id}/transform
async fn transform_track(
    session: Session,
    State(manager): State<TransformManager>,
    Path(id): Path<i64>,
    body: Result<Json<TransformRequest>, JsonRejection>,
) -> Response {
    // Malformed bodies (unknown style names etc.) get the same JSON error
    // shape as domain validation failures
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return error_response(StatusCode::BAD_REQUEST, rejection.body_text()),
    };
    match manager.request(session.user_id, id, body) {
        Ok(transformations) => (StatusCode::CREATED, Json(transformations)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub fn make_track_routes(state: ServerState) -> Router {
    // The limit exceeds the upload cap so oversized payloads reach our own
    // validation and get the JSON error instead of a bare 413
    Router::new()
        .route("/", post(upload_track).get(list_tracks))
        .route("/search", get(search_tracks))
        .route(
            "/{id}",
            get(get_track).put(rename_track).delete(delete_track),
        )
        .route("/{id}/transform", post(transform_track))
        .layer(DefaultBodyLimit::max((MAX_UPLOAD_BYTES as usize) * 2))
        .with_state(state)
}
