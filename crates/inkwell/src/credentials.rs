//! Password hashing.
//!
//! The store only ever sees the opaque strings produced here.

use rand::rngs::OsRng;
use scrypt::password_hash::{
    self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};
use scrypt::Scrypt;

use crate::error::{BlogError, Result};

/// Hashes and verifies passwords.
///
/// Implementations are called off the async runtime, on a blocking thread.
pub trait Credentials: Send + Sync + 'static {
    /// Hash a plaintext password into an opaque secret.
    fn hash(&self, password: &str) -> Result<String>;

    /// Check a plaintext password against a secret from [`Credentials::hash`].
    ///
    /// Returns [`BlogError::InvalidCredential`] on mismatch.
    fn verify(&self, secret: &str, password: &str) -> Result<()>;
}

/// scrypt with a random salt, stored as a PHC string.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScryptCredentials;

impl Credentials for ScryptCredentials {
    fn hash(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        Scrypt
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| BlogError::Credential(e.to_string()))
    }

    fn verify(&self, secret: &str, password: &str) -> Result<()> {
        let parsed =
            PasswordHash::new(secret).map_err(|e| BlogError::Credential(e.to_string()))?;
        Scrypt
            .verify_password(password.as_bytes(), &parsed)
            .map_err(|e| match e {
                password_hash::Error::Password => BlogError::InvalidCredential,
                other => BlogError::Credential(other.to_string()),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scrypt_hash_and_verify() {
        let creds = ScryptCredentials;
        let secret = creds.hash("hunter2").unwrap();

        assert!(secret.starts_with("$scrypt$"));
        assert!(!secret.contains("hunter2"));
        creds.verify(&secret, "hunter2").unwrap();
        assert!(matches!(
            creds.verify(&secret, "hunter3"),
            Err(BlogError::InvalidCredential)
        ));
    }

    #[test]
    fn test_salts_differ() {
        let creds = ScryptCredentials;
        assert_ne!(creds.hash("same").unwrap(), creds.hash("same").unwrap());
    }

    #[test]
    fn test_garbage_secret() {
        let err = ScryptCredentials.verify("not a phc string", "pw").unwrap_err();
        assert!(matches!(err, BlogError::Credential(_)));
    }
}
