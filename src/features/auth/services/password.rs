use crate::core::error::{AppError, Result};

/// Fixed bcrypt cost factor. Raising it is a configuration change, not a
/// runtime decision.
const BCRYPT_COST: u32 = 10;

/// Hash a plaintext password with a random salt.
pub fn hash_password(plain: &str) -> Result<String> {
    bcrypt::hash(plain, BCRYPT_COST)
        .map_err(|e| AppError::Internal(format!("password hashing failed: {}", e)))
}

/// Verify a plaintext password against a stored hash.
///
/// Returns false on mismatch and on a malformed stored hash; never errors.
pub fn verify_password(plain: &str, hash: &str) -> bool {
    bcrypt::verify(plain, hash).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correct_password_verifies() {
        let hash = hash_password("hunter2!").unwrap();
        assert!(verify_password("hunter2!", &hash));
    }

    #[test]
    fn wrong_password_fails() {
        let hash = hash_password("hunter2!").unwrap();
        assert!(!verify_password("hunter3!", &hash));
    }

    #[test]
    fn malformed_hash_returns_false_instead_of_erroring() {
        assert!(!verify_password("anything", "not-a-bcrypt-hash"));
        assert!(!verify_password("anything", ""));
    }

    #[test]
    fn hashes_are_salted() {
        let a = hash_password("same").unwrap();
        let b = hash_password("same").unwrap();
        assert_ne!(a, b);
    }
}
