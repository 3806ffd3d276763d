//! Media storage for uploaded tracks and transformed outputs.

use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// Errors that can occur while validating or storing an upload.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid filename: {0}")]
    InvalidFilename(String),

    #[error("Unsupported content type: {0}")]
    UnsupportedContentType(String),

    #[error("File too large: {0} bytes (max: {1})")]
    FileTooLarge(u64, u64),
}

/// Largest accepted upload: 50 MB.
pub const MAX_UPLOAD_BYTES: u64 = 50 * 1024 * 1024;

/// Declared content types accepted for uploads.
pub const ALLOWED_CONTENT_TYPES: &[&str] = &[
    "audio/mpeg",
    "audio/wav",
    "audio/mp3",
    "audio/m4a",
    "audio/flac",
];

const ORIGINALS_DIR: &str = "original_tracks";
const TRANSFORMED_DIR: &str = "transformed_tracks";

/// File storage rooted at the media directory. Uploads land under
/// `original_tracks/`, worker outputs under `transformed_tracks/`; store
/// rows reference both by root-relative path.
pub struct MediaStorage {
    root: PathBuf,
}

impl MediaStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the storage directories.
    pub async fn init(&self) -> Result<(), MediaError> {
        fs::create_dir_all(self.root.join(ORIGINALS_DIR)).await?;
        fs::create_dir_all(self.root.join(TRANSFORMED_DIR)).await?;
        Ok(())
    }

    /// Validate an upload before anything is written.
    ///
    /// The declared content type must be on the allow list, and when the
    /// payload's real type can be sniffed it must be audio too. Unknown
    /// payloads pass on the declared type alone.
    pub fn validate_upload(&self, content_type: &str, data: &[u8]) -> Result<(), MediaError> {
        let size = data.len() as u64;
        if size > MAX_UPLOAD_BYTES {
            return Err(MediaError::FileTooLarge(size, MAX_UPLOAD_BYTES));
        }
        if !ALLOWED_CONTENT_TYPES.contains(&content_type) {
            return Err(MediaError::UnsupportedContentType(content_type.to_string()));
        }
        if let Some(kind) = infer::get(data) {
            if !kind.mime_type().starts_with("audio/") {
                return Err(MediaError::UnsupportedContentType(
                    kind.mime_type().to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Store an uploaded file and return its root-relative path.
    pub async fn save_original(&self, filename: &str, data: &[u8]) -> Result<String, MediaError> {
        let safe_name = sanitize_filename(filename)?;
        // Uuid prefix keeps repeated uploads of the same filename apart
        let stored_name = format!("{}_{}", Uuid::new_v4(), safe_name);
        let relative = format!("{}/{}", ORIGINALS_DIR, stored_name);

        let path = self.root.join(&relative);
        fs::create_dir_all(self.root.join(ORIGINALS_DIR)).await?;
        let mut file = fs::File::create(&path).await?;
        file.write_all(data).await?;
        file.flush().await?;

        Ok(relative)
    }

    /// Remove a stored file by its root-relative path, ignoring absence.
    pub async fn remove(&self, relative: &str) -> Result<(), MediaError> {
        let path = self.root.join(relative);
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Size in megabytes as stored on track rows.
pub fn file_size_mb(bytes: u64) -> f64 {
    bytes as f64 / (1024.0 * 1024.0)
}

/// Sanitize a filename to prevent path traversal.
fn sanitize_filename(filename: &str) -> Result<String, MediaError> {
    let name = Path::new(filename)
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| MediaError::InvalidFilename(filename.to_string()))?;

    if name.contains('\0') || name.starts_with('.') {
        return Err(MediaError::InvalidFilename(filename.to_string()));
    }

    let sanitized: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            _ => c,
        })
        .collect();

    if sanitized.is_empty() {
        return Err(MediaError::InvalidFilename(filename.to_string()));
    }

    Ok(sanitized)
}
