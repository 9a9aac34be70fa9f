//! Password hashing backed by bcrypt.

use crate::errors::AppError;
use bcrypt::{DEFAULT_COST, hash, verify};

pub fn hash_password(password: &str) -> Result<String, AppError> {
    hash(password, DEFAULT_COST)
        .map_err(|e| AppError::internal_error(format!("Failed to hash password: {}", e)))
}

/// Returns `false` for malformed hashes instead of failing the request.
pub fn verify_password(password: &str, hashed: &str) -> bool {
    verify(password, hashed).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hashed = hash_password("coach-pass-123").unwrap();
        assert_ne!(hashed, "coach-pass-123");
        assert!(verify_password("coach-pass-123", &hashed));
        assert!(!verify_password("wrong", &hashed));
    }

    #[test]
    fn test_verify_malformed_hash() {
        assert!(!verify_password("anything", "not-a-bcrypt-hash"));
    }
}
