//! User identity: credentials and session issuance.

pub mod auth;

use crate::track_store::TrackStore;
use anyhow::Result;

/// Create a user with password credentials.
pub fn provision_user(store: &dyn TrackStore, handle: &str, password: &str) -> Result<i64> {
    let user_id = store.create_user(handle)?;
    store.set_user_password_hash(user_id, &auth::hash_password(password)?)?;
    Ok(user_id)
}

/// Verify credentials and mint a session token. Returns None when the
/// handle is unknown or the password does not match; the two are not
/// distinguished.
pub fn login(store: &dyn TrackStore, handle: &str, password: &str) -> Result<Option<String>> {
    let user_id = match store.get_user_id(handle)? {
        Some(id) => id,
        None => return Ok(None),
    };
    let stored_hash = match store.get_user_password_hash(user_id)? {
        Some(hash) => hash,
        None => return Ok(None),
    };
    if !auth::verify_password(password, &stored_hash)? {
        return Ok(None);
    }
    let token = auth::generate_session_token();
    store.add_auth_token(user_id, &token)?;
    Ok(Some(token))
}
