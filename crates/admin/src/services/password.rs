//! Argon2id password hashing for admin accounts.
//!
//! Every stored credential is produced by [`PasswordHasher::hash`]; there is
//! no implicit hashing on save.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use crate::config::HashingConfig;

/// Minimum password length in characters.
pub const MIN_PASSWORD_LENGTH: usize = 6;
/// Maximum password length in characters.
pub const MAX_PASSWORD_LENGTH: usize = 128;

/// Errors from password validation and hashing.
#[derive(Debug, Error)]
pub enum PasswordError {
    /// Password is shorter than [`MIN_PASSWORD_LENGTH`].
    #[error("password must be at least {MIN_PASSWORD_LENGTH} characters")]
    TooShort,

    /// Password is longer than [`MAX_PASSWORD_LENGTH`].
    #[error("password must be at most {MAX_PASSWORD_LENGTH} characters")]
    TooLong,

    /// The configured cost parameters are rejected by argon2.
    #[error("invalid hashing parameters: {0}")]
    Params(String),

    /// Hash computation failed.
    #[error("password hashing failed: {0}")]
    Hash(String),
}

/// Check the length rules for a new password.
///
/// # Errors
///
/// Returns `PasswordError::TooShort` or `PasswordError::TooLong`.
pub fn validate_new_password(password: &str) -> Result<(), PasswordError> {
    let len = password.chars().count();
    if len < MIN_PASSWORD_LENGTH {
        return Err(PasswordError::TooShort);
    }
    if len > MAX_PASSWORD_LENGTH {
        return Err(PasswordError::TooLong);
    }
    Ok(())
}

/// Argon2id hasher configured with the deployment's cost parameters.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    params: Params,
}

impl PasswordHasher {
    /// Create a hasher from configured costs.
    ///
    /// # Errors
    ///
    /// Returns `PasswordError::Params` if argon2 rejects the combination.
    pub fn new(config: HashingConfig) -> Result<Self, PasswordError> {
        let params = Params::new(config.memory_kib, config.iterations, config.parallelism, None)
            .map_err(|e| PasswordError::Params(e.to_string()))?;
        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Validate and hash a new password into a PHC string.
    ///
    /// # Errors
    ///
    /// Returns a length error or `PasswordError::Hash`.
    pub fn hash(&self, password: &SecretString) -> Result<String, PasswordError> {
        let password = password.expose_secret();
        validate_new_password(password)?;

        let salt = SaltString::generate(&mut OsRng);
        self.argon2()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| PasswordError::Hash(e.to_string()))
    }

    /// Verify a password against a stored PHC string.
    ///
    /// Costs are read from the stored hash, so accounts hashed under older
    /// parameters keep working. A malformed stored hash never verifies.
    #[must_use]
    pub fn verify(&self, password: &SecretString, stored_hash: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(stored_hash) else {
            tracing::warn!("Stored password hash is not a valid PHC string");
            return false;
        };

        self.argon2()
            .verify_password(password.expose_secret().as_bytes(), &parsed)
            .is_ok()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn hasher() -> PasswordHasher {
        PasswordHasher::new(HashingConfig::fast()).unwrap()
    }

    #[test]
    fn test_hash_and_verify() {
        let hasher = hasher();
        let hash = hasher.hash(&SecretString::from("admin12345")).unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify(&SecretString::from("admin12345"), &hash));
        assert!(!hasher.verify(&SecretString::from("admin12346"), &hash));
    }

    #[test]
    fn test_hashes_are_salted() {
        let hasher = hasher();
        let password = SecretString::from("same-password");
        assert_ne!(
            hasher.hash(&password).unwrap(),
            hasher.hash(&password).unwrap()
        );
    }

    #[test]
    fn test_verify_uses_stored_params() {
        let stored = hasher().hash(&SecretString::from("secret-pw")).unwrap();
        let stronger = PasswordHasher::new(HashingConfig {
            memory_kib: 64,
            iterations: 2,
            parallelism: 1,
        })
        .unwrap();
        assert!(stronger.verify(&SecretString::from("secret-pw"), &stored));
    }

    #[test]
    fn test_length_rules() {
        assert!(matches!(
            validate_new_password("12345"),
            Err(PasswordError::TooShort)
        ));
        assert!(validate_new_password("123456").is_ok());
        assert!(matches!(
            validate_new_password(&"x".repeat(129)),
            Err(PasswordError::TooLong)
        ));
    }

    #[test]
    fn test_malformed_hash_never_verifies() {
        assert!(!hasher().verify(&SecretString::from("anything"), "plaintext"));
    }

    #[test]
    fn test_invalid_params_rejected() {
        let result = PasswordHasher::new(HashingConfig {
            memory_kib: 1,
            iterations: 0,
            parallelism: 1,
        });
        assert!(matches!(result, Err(PasswordError::Params(_))));
    }
}
