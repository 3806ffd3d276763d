use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use trackmorph_server::config::FileConfig;
use trackmorph_server::media::MediaStorage;
use trackmorph_server::server::{run_server, RequestsLoggingLevel, ServerConfig};
use trackmorph_server::spotify::{SpotifyClient, SpotifyConfig};
use trackmorph_server::track_store::SqliteTrackStore;
use trackmorph_server::user;

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to the SQLite database file.
    #[clap(value_parser = parse_path)]
    pub db_path: PathBuf,

    /// Path to the media directory (uploads and transformed outputs).
    #[clap(long, value_parser = parse_path)]
    pub media_path: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 8080)]
    pub port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Optional TOML config file, overrides CLI settings.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Create a user with this handle and exit (reads password from
    /// TRACKMORPH_PASSWORD).
    #[clap(long)]
    pub add_user: Option<String>,
}

fn spotify_from_env() -> Option<SpotifyConfig> {
    let client_id = std::env::var("SPOTIFY_CLIENT_ID").ok()?;
    let client_secret = std::env::var("SPOTIFY_CLIENT_SECRET").ok()?;
    let redirect_uri = std::env::var("SPOTIFY_REDIRECT_URI").ok()?;
    Some(SpotifyConfig {
        client_id,
        client_secret,
        redirect_uri,
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to init logging: {}", e))?;

    let file_config = match &cli_args.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };

    let db_path = file_config
        .db_path
        .map(PathBuf::from)
        .unwrap_or(cli_args.db_path);

    // Default media path to the db's parent directory
    let media_path = file_config
        .media_path
        .map(PathBuf::from)
        .or(cli_args.media_path)
        .unwrap_or_else(|| {
            db_path
                .parent()
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| PathBuf::from("."))
        });

    info!("Opening SQLite database at {:?}...", db_path);
    let track_store = Arc::new(SqliteTrackStore::open(&db_path)?);

    if let Some(handle) = cli_args.add_user {
        let password = std::env::var("TRACKMORPH_PASSWORD")
            .context("TRACKMORPH_PASSWORD must be set when using --add-user")?;
        let user_id = user::provision_user(track_store.as_ref(), &handle, &password)?;
        info!("Created user '{}' with id {}", handle, user_id);
        return Ok(());
    }

    info!("Media directory at {:?}", media_path);
    let media = Arc::new(MediaStorage::new(&media_path));
    media.init().await?;

    let spotify = file_config
        .spotify
        .or_else(spotify_from_env)
        .map(|config| {
            info!("Spotify integration configured");
            Arc::new(SpotifyClient::new(config))
        });
    if spotify.is_none() {
        info!("Spotify integration not configured, OAuth routes disabled");
    }

    let logging_level = match file_config.logging_level.as_deref() {
        Some("none") => RequestsLoggingLevel::None,
        Some("path") => RequestsLoggingLevel::Path,
        Some("headers") => RequestsLoggingLevel::Headers,
        Some("body") => RequestsLoggingLevel::Body,
        _ => cli_args.logging_level,
    };
    let port = file_config.port.unwrap_or(cli_args.port);

    let config = ServerConfig {
        requests_logging_level: logging_level,
        port,
    };

    info!("Ready to serve at port {}!", port);
    run_server(config, track_store, media, spotify).await
}
