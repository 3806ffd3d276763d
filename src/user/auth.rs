//! Password hashing and session token generation.

use anyhow::{anyhow, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::Rng;
use rand_distr::Alphanumeric;

/// Generate a fresh 64-character alphanumeric session token.
pub fn generate_session_token() -> String {
    let rng = rand::rng();
    rng.sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect()
}

/// Hash a password with argon2 and a fresh salt. The salt is encoded into
/// the returned PHC string.
pub fn hash_password(plain: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|err| anyhow!("{}", err))?
        .to_string();
    Ok(hash)
}

/// Verify a password against a stored PHC hash string.
pub fn verify_password(plain: &str, stored_hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(stored_hash).map_err(|err| anyhow!("{}", err))?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}
