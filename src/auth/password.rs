//! Salted password hashing (Argon2id, PHC string format).
//!
//! Hashing is CPU-bound and runs on the blocking pool.

use argon2::password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};

use crate::error::{AppError, AppResult, AuthError};

// Fixed work factor: 19 MiB, 2 passes, 1 lane.
const MEMORY_KIB: u32 = 19_456;
const ITERATIONS: u32 = 2;
const PARALLELISM: u32 = 1;

/// Valid PHC string that no password matches; verified against when the
/// account does not exist so both login failures cost the same.
pub(crate) const DECOY_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$c29tZXNhbHQ$AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";

fn argon2() -> AppResult<Argon2<'static>> {
    let params = Params::new(MEMORY_KIB, ITERATIONS, PARALLELISM, None)
        .map_err(|e| AppError::internal(format!("invalid argon2 parameters: {}", e)))?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

pub fn hash_password_blocking(plaintext: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut rand::rngs::OsRng);
    let hash = argon2()?
        .hash_password(plaintext.as_bytes(), &salt)
        .map_err(|e| AppError::internal(format!("password hashing failed: {}", e)))?;
    Ok(hash.to_string())
}

/// `Ok(false)` on mismatch; `Malformed` only when `hash` can't be parsed.
pub fn verify_password_blocking(plaintext: &str, hash: &str) -> Result<bool, AuthError> {
    let parsed = PasswordHash::new(hash).map_err(|e| AuthError::malformed(e.to_string()))?;
    // Parameters are read from the PHC string itself.
    match Argon2::default().verify_password(plaintext.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AuthError::malformed(e.to_string())),
    }
}

pub async fn hash_password(plaintext: &str) -> AppResult<String> {
    let plaintext = plaintext.to_owned();
    tokio::task::spawn_blocking(move || hash_password_blocking(&plaintext))
        .await
        .map_err(|e| AppError::internal(format!("hashing task failed: {}", e)))?
}

pub async fn verify_password(plaintext: &str, hash: &str) -> AppResult<bool> {
    let plaintext = plaintext.to_owned();
    let hash = hash.to_owned();
    let verified = tokio::task::spawn_blocking(move || verify_password_blocking(&plaintext, &hash))
        .await
        .map_err(|e| AppError::internal(format!("verification task failed: {}", e)))??;
    Ok(verified)
}
