use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use rand::{Rng, rng};
use std::sync::LazyLock;
use thiserror::Error;

use super::LoginError;

const SALT_LENGTH: usize = 16;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("password hashing error: {0}")]
    Hash(String),
}

impl From<argon2::password_hash::Error> for PasswordError {
    fn from(err: argon2::password_hash::Error) -> Self {
        PasswordError::Hash(err.to_string())
    }
}

/// Hash a password with Argon2id and a random salt, returning a PHC string.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt_bytes = rng().random::<[u8; SALT_LENGTH]>();
    let salt = SaltString::encode_b64(&salt_bytes)?;
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

static DUMMY_HASH: LazyLock<String> =
    LazyLock::new(|| hash_password("selfly-unknown-user").unwrap_or_default());

/// A valid hash that no login password is checked against successfully.
/// Used for unknown usernames.
pub fn dummy_password_hash() -> &'static str {
    &DUMMY_HASH
}

/// A malformed stored hash never verifies.
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    match PasswordHash::new(password_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

pub async fn hash_password_blocking(password: String) -> Result<String, LoginError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| LoginError::InternalError(e.to_string()))?
        .map_err(|e| LoginError::InternalError(e.to_string()))
}

pub async fn verify_password_blocking(password: String, password_hash: String) -> bool {
    tokio::task::spawn_blocking(move || verify_password(&password, &password_hash))
        .await
        .unwrap_or(false)
}
