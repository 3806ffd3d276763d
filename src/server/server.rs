use anyhow::Result;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, error};

use axum_extra::extract::cookie::{Cookie, SameSite};
use tower_http::services::ServeDir;

use axum::{
    body::Body,
    extract::{Query, State},
    http::{response, HeaderValue, StatusCode},
    middleware,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::http_layers::log_requests;
use super::job_routes::make_job_routes;
use super::session::Session;
use super::state::*;
use super::track_routes::make_track_routes;
use super::transform_routes::make_transform_routes;
use super::ServerConfig;
use crate::media::MediaStorage;
use crate::spotify::{spotify_handle, SpotifyClient};
use crate::track_store::TrackStore;
use crate::transform::TransformManager;
use crate::user;

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub hash: String,
    pub session_token: Option<String>,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

#[derive(Deserialize, Debug)]
struct LoginBody {
    pub handle: String,
    pub password: String,
}

#[derive(Serialize)]
struct LoginSuccessResponse {
    token: String,
}

#[derive(Deserialize, Debug)]
struct SpotifyCallbackQuery {
    pub code: Option<String>,
    pub error: Option<String>,
}

async fn home(session: Option<Session>, State(state): State<ServerState>) -> impl IntoResponse {
    let stats = ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        hash: state.hash.clone(),
        session_token: session.map(|s| s.token),
    };
    Json(stats)
}

fn session_response(token: &str, status: StatusCode, body: Body) -> Response {
    let cookie_value = match HeaderValue::from_str(&format!(
        "session_token={}; Path=/; HttpOnly",
        token
    )) {
        Ok(value) => value,
        Err(_) => return StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    };
    response::Builder::new()
        .status(status)
        .header(axum::http::header::CONTENT_TYPE, "application/json")
        .header(axum::http::header::SET_COOKIE, cookie_value)
        .body(body)
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}

async fn login(
    State(store): State<GuardedTrackStore>,
    Json(body): Json<LoginBody>,
) -> Response {
    debug!("login() called for handle {}", body.handle);
    match user::login(store.as_ref(), &body.handle, &body.password) {
        Ok(Some(token)) => {
            let response_body = LoginSuccessResponse {
                token: token.clone(),
            };
            let response_body = match serde_json::to_string(&response_body) {
                Ok(json) => json,
                Err(_) => return StatusCode::INTERNAL_SERVER_ERROR.into_response(),
            };
            session_response(&token, StatusCode::CREATED, Body::from(response_body))
        }
        Ok(None) => StatusCode::FORBIDDEN.into_response(),
        Err(err) => {
            error!("Login failed: {:#}", err);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn logout(State(store): State<GuardedTrackStore>, session: Session) -> Response {
    match store.delete_auth_token(&session.token) {
        Ok(_) => {
            let cookie_value = Cookie::build(Cookie::new("session_token", ""))
                .path("/")
                .expires(time::OffsetDateTime::now_utc() - time::Duration::days(1)) // Expire it in the past
                .same_site(SameSite::Lax)
                .build();

            response::Builder::new()
                .status(StatusCode::OK)
                .header(axum::http::header::SET_COOKIE, cookie_value.to_string())
                .body(Body::empty())
                .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
        }
        Err(_) => StatusCode::BAD_REQUEST.into_response(),
    }
}

fn get_spotify_client(
    client: &OptionalSpotifyClient,
) -> Result<&SpotifyClient, (StatusCode, &'static str)> {
    client.as_ref().map(|arc| arc.as_ref()).ok_or((
        StatusCode::SERVICE_UNAVAILABLE,
        "Spotify integration not configured",
    ))
}

async fn spotify_login(State(client): State<OptionalSpotifyClient>) -> Response {
    match get_spotify_client(&client) {
        Ok(client) => Redirect::temporary(&client.authorize_url()).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn spotify_callback(
    State(client): State<OptionalSpotifyClient>,
    State(store): State<GuardedTrackStore>,
    Query(query): Query<SpotifyCallbackQuery>,
) -> Response {
    let client = match get_spotify_client(&client) {
        Ok(client) => client,
        Err(e) => return e.into_response(),
    };

    if let Some(err) = query.error {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": format!("Spotify authorization failed: {}", err)})),
        )
            .into_response();
    }
    let code = match query.code {
        Some(code) => code,
        None => {
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({"error": "missing authorization code"})),
            )
                .into_response()
        }
    };

    let tokens = match client.exchange_code(&code).await {
        Ok(tokens) => tokens,
        Err(err) => {
            error!("Spotify token exchange failed: {:#}", err);
            return StatusCode::BAD_GATEWAY.into_response();
        }
    };
    let profile = match client.current_user(&tokens.access_token).await {
        Ok(profile) => profile,
        Err(err) => {
            error!("Spotify profile fetch failed: {:#}", err);
            return StatusCode::BAD_GATEWAY.into_response();
        }
    };

    let spotify_id = match profile.get("id").and_then(|v| v.as_str()) {
        Some(id) => id.to_string(),
        None => {
            error!("Spotify profile has no id field");
            return StatusCode::BAD_GATEWAY.into_response();
        }
    };

    // First Spotify login creates the local user
    let handle = spotify_handle(&spotify_id);
    let session_token = (|| -> Result<String> {
        let user_id = match store.get_user_id(&handle)? {
            Some(id) => id,
            None => store.create_user(&handle)?,
        };
        let token = crate::user::auth::generate_session_token();
        store.add_auth_token(user_id, &token)?;
        Ok(token)
    })();
    let session_token = match session_token {
        Ok(token) => token,
        Err(err) => {
            error!("Failed to establish Spotify-backed session: {:#}", err);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let body = match serde_json::to_string(&profile) {
        Ok(json) => json,
        Err(_) => return StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    };
    session_response(&session_token, StatusCode::OK, Body::from(body))
}

async fn profile_stats(session: Session, State(manager): State<TransformManager>) -> Response {
    match manager.stats(session.user_id) {
        Ok(profile) => Json(profile).into_response(),
        Err(e) => e.into_response(),
    }
}

pub fn make_app(
    config: ServerConfig,
    track_store: Arc<dyn TrackStore>,
    media: Arc<MediaStorage>,
    spotify: Option<Arc<SpotifyClient>>,
) -> Router {
    let state = ServerState {
        config: config.clone(),
        start_time: Instant::now(),
        transform_manager: TransformManager::new(track_store.clone()),
        track_store,
        media: media.clone(),
        spotify,
        hash: env!("GIT_HASH").to_owned(),
    };

    let auth_routes: Router = Router::new()
        .route("/login", post(login))
        .route("/logout", get(logout))
        .route("/spotify/login", get(spotify_login))
        .route("/spotify/callback", get(spotify_callback))
        .with_state(state.clone());

    let profile_routes: Router = Router::new()
        .route("/stats", get(profile_stats))
        .with_state(state.clone());

    let home_router: Router = Router::new()
        .route("/", get(home))
        .with_state(state.clone());

    let mut app: Router = home_router
        .nest("/v1/auth", auth_routes)
        .nest("/v1/tracks", make_track_routes(state.clone()))
        .nest("/v1/transformations", make_transform_routes(state.clone()))
        .nest("/v1/jobs", make_job_routes(state.clone()))
        .nest("/v1/profile", profile_routes)
        .nest_service("/media", ServeDir::new(media.root()));

    app = app.layer(middleware::from_fn_with_state(state, log_requests));

    app
}

pub async fn run_server(
    config: ServerConfig,
    track_store: Arc<dyn TrackStore>,
    media: Arc<MediaStorage>,
    spotify: Option<Arc<SpotifyClient>>,
) -> Result<()> {
    let port = config.port;
    let app = make_app(config, track_store, media, spotify);

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port)).await?;

    Ok(axum::serve(listener, app).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track_store::SqliteTrackStore;
    use axum::{body::Body, http::Request};
    use tower::ServiceExt;

    fn test_app() -> Router {
        let store = Arc::new(SqliteTrackStore::in_memory().unwrap());
        let media = Arc::new(MediaStorage::new(std::env::temp_dir()));
        make_app(ServerConfig::default(), store, media, None)
    }

    #[tokio::test]
    async fn responds_forbidden_on_protected_routes() {
        let app = test_app();

        let protected_routes = vec![
            "/v1/tracks",
            "/v1/tracks/1",
            "/v1/tracks/search?q=x",
            "/v1/transformations",
            "/v1/transformations/1",
            "/v1/transformations/1/download",
            "/v1/jobs",
            "/v1/jobs/active",
            "/v1/jobs/some-uuid",
            "/v1/profile/stats",
            "/v1/auth/logout",
        ];

        for route in protected_routes.into_iter() {
            println!("Trying route {}", route);
            let request = Request::builder().uri(route).body(Body::empty()).unwrap();
            let response = app.clone().oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::FORBIDDEN);
        }
    }

    #[tokio::test]
    async fn home_is_public() {
        let app = test_app();
        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn spotify_login_unconfigured_is_service_unavailable() {
        let app = test_app();
        let request = Request::builder()
            .uri("/v1/auth/spotify/login")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn uptime_formatting() {
        assert_eq!(format_uptime(Duration::from_secs(0)), "0d 00:00:00");
        assert_eq!(
            format_uptime(Duration::from_secs(90_061)),
            "1d 01:01:01"
        );
    }
}
