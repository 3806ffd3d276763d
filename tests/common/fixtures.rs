//! Test fixture creation: database with users, media directory.

use super::constants::*;
use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;
use trackmorph_server::track_store::SqliteTrackStore;
use trackmorph_server::user::provision_user;

/// Creates a temporary database seeded with the two test users.
/// Returns (temp_dir, store, media_path).
pub fn create_test_store() -> Result<(TempDir, Arc<SqliteTrackStore>, PathBuf)> {
    let dir = TempDir::new()?;
    let db_path = dir.path().join("trackmorph.db");
    let media_path = dir.path().join("media");
    std::fs::create_dir_all(&media_path)?;

    let store = Arc::new(SqliteTrackStore::open(&db_path)?);
    provision_user(store.as_ref(), TEST_USER, TEST_PASS)?;
    provision_user(store.as_ref(), OTHER_USER, OTHER_PASS)?;

    Ok((dir, store, media_path))
}

/// A small payload standing in for a wav upload. Not decodable audio, but
/// the server only sniffs for known non-audio signatures.
pub fn fake_wav_bytes() -> Vec<u8> {
    let mut bytes = b"RIFF\x24\x00\x00\x00WAVEfmt ".to_vec();
    bytes.extend(std::iter::repeat(0u8).take(512));
    bytes
}
