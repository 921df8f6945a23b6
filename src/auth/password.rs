use bcrypt::{DEFAULT_COST, hash, verify};

#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("Password hashing failed: {0}")]
    HashingFailed(bcrypt::BcryptError),
    #[error("Password verification failed: {0}")]
    VerificationFailed(bcrypt::BcryptError),
}

/// One-way hash + verify facade over bcrypt. The rest of the crate never
/// sees a digest format, only this pair of operations.
pub struct PasswordManager;

impl PasswordManager {
    pub fn hash(password: &str) -> Result<String, PasswordError> {
        hash(password, DEFAULT_COST).map_err(PasswordError::HashingFailed)
    }

    pub fn verify(password: &str, hash: &str) -> Result<bool, PasswordError> {
        verify(password, hash).map_err(PasswordError::VerificationFailed)
    }
}

#[cfg(test)]
mod tests {
    use super::PasswordManager;

    #[test]
    fn verify_accepts_the_hashed_password() {
        let hashed = PasswordManager::hash("abcd1234").expect("Hashing failed");
        assert!(PasswordManager::verify("abcd1234", &hashed).expect("Verification failed"));
    }

    #[test]
    fn verify_rejects_a_different_password() {
        let hashed = PasswordManager::hash("abcd1234").expect("Hashing failed");
        assert!(!PasswordManager::verify("abcd12345", &hashed).expect("Verification failed"));
    }

    #[test]
    fn hashing_is_salted_so_equal_passwords_get_distinct_digests() {
        let first = PasswordManager::hash("same_password1").unwrap();
        let second = PasswordManager::hash("same_password1").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn verify_returns_false_not_error_on_case_mismatch() {
        let hashed = PasswordManager::hash("MyPassword1").unwrap();
        let result = PasswordManager::verify("mypassword1", &hashed);
        assert!(result.is_ok());
        assert!(!result.unwrap());
    }
}
