//! Password hashing with bcrypt.
//!
//! Hashes are salted and slow by construction. `verify_password` compares
//! digests in constant time. Plaintext passwords are never logged.
//!
//! bcrypt ignores everything past the first 72 bytes of its input, so longer
//! passwords are refused outright instead of being truncated.

use bcrypt::{DEFAULT_COST, hash, verify};

use crate::errors::AuthError;

/// Longest password bcrypt hashes in full, in bytes.
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Rejects passwords bcrypt would truncate. The limit is in bytes, not chars.
pub fn check_password_length(password: &str) -> Result<(), AuthError> {
    if password.len() > MAX_PASSWORD_BYTES {
        return Err(AuthError::validation(format!(
            "password must be at most {MAX_PASSWORD_BYTES} bytes"
        )));
    }
    Ok(())
}

pub fn hash_password(password: &str) -> Result<String, AuthError> {
    hash_password_with_cost(password, DEFAULT_COST)
}

pub fn hash_password_with_cost(password: &str, cost: u32) -> Result<String, AuthError> {
    check_password_length(password)?;
    hash(password, cost).map_err(AuthError::Hashing)
}

/// Returns `Ok(false)` on mismatch and an error only when `hash` is not a
/// bcrypt hash or `password` is too long to have been hashed in full.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    check_password_length(password)?;
    verify(password, hash).map_err(AuthError::Hashing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bcrypt::DEFAULT_COST;

    // Keeps unit tests fast; production uses the configured cost.
    const TEST_COST: u32 = 4;

    #[test]
    fn test_hash_and_verify_with_cost() {
        let hash = hash_password_with_cost("pw123", TEST_COST).unwrap();
        assert!(hash.starts_with("$2"));
        assert!(verify_password("pw123", &hash).unwrap());
        assert!(!verify_password("pw124", &hash).unwrap());
    }

    #[test]
    fn test_invalid_cost_is_a_hashing_error() {
        let result = hash_password_with_cost("pw123", 2);
        assert!(matches!(result, Err(AuthError::Hashing(_))));
    }

    #[test]
    fn test_length_limit_counts_bytes() {
        // 40 chars, 80 bytes
        let long = "é".repeat(40);
        assert!(matches!(
            hash_password_with_cost(&long, TEST_COST),
            Err(AuthError::Validation(_))
        ));

        let hash = hash_password_with_cost(&"é".repeat(36), TEST_COST).unwrap();
        assert!(matches!(
            verify_password(&long, &hash),
            Err(AuthError::Validation(_))
        ));
        assert!(check_password_length(&"a".repeat(MAX_PASSWORD_BYTES)).is_ok());
    }

    #[test]
    fn test_default_cost_is_encoded_in_hash() {
        let hash = hash_password("pw123").unwrap();
        assert!(hash.contains(&format!("${:02}$", DEFAULT_COST)));
    }
}
