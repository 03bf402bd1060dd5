// Password hashing and verification service

use crate::auth::error::AuthError;

/// bcrypt work factor for every stored digest
pub const BCRYPT_COST: u32 = 10;

/// Password service for hashing and verification
pub struct PasswordService;

impl PasswordService {
    /// Hash a password with a freshly generated salt
    pub fn hash_password(password: &str) -> Result<String, AuthError> {
        bcrypt::hash(password, BCRYPT_COST).map_err(|e| AuthError::PasswordHashError(e.to_string()))
    }

    /// Verify a password against a stored digest
    pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
        bcrypt::verify(password, hash).map_err(|e| AuthError::PasswordHashError(e.to_string()))
    }

    /// `hash_password` on the blocking pool; bcrypt is deliberately slow
    pub async fn hash_password_async(password: String) -> Result<String, AuthError> {
        tokio::task::spawn_blocking(move || Self::hash_password(&password))
            .await
            .map_err(|e| AuthError::PasswordHashError(e.to_string()))?
    }

    /// `verify_password` on the blocking pool
    pub async fn verify_password_async(password: String, hash: String) -> Result<bool, AuthError> {
        tokio::task::spawn_blocking(move || Self::verify_password(&password, &hash))
            .await
            .map_err(|e| AuthError::PasswordHashError(e.to_string()))?
    }
}
