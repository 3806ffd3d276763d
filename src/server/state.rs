use axum::extract::FromRef;

use crate::media::MediaStorage;
use crate::spotify::SpotifyClient;
use crate::track_store::TrackStore;
use crate::transform::TransformManager;
use std::sync::Arc;
use std::time::Instant;

use super::ServerConfig;

pub type GuardedTrackStore = Arc<dyn TrackStore>;
pub type GuardedMediaStorage = Arc<MediaStorage>;
pub type OptionalSpotifyClient = Option<Arc<SpotifyClient>>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub track_store: GuardedTrackStore,
    pub transform_manager: TransformManager,
    pub media: GuardedMediaStorage,
    pub spotify: OptionalSpotifyClient,
    pub hash: String,
}

impl FromRef<ServerState> for GuardedTrackStore {
    fn from_ref(input: &ServerState) -> Self {
        input.track_store.clone()
    }
}

impl FromRef<ServerState> for TransformManager {
    fn from_ref(input: &ServerState) -> Self {
        input.transform_manager.clone()
    }
}

impl FromRef<ServerState> for GuardedMediaStorage {
    fn from_ref(input: &ServerState) -> Self {
        input.media.clone()
    }
}

impl FromRef<ServerState> for OptionalSpotifyClient {
    fn from_ref(input: &ServerState) -> Self {
        input.spotify.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}
