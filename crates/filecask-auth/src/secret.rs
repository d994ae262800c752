//! Argon2id verification of the configured admin secret.

use argon2::{
    Argon2,
    password_hash::{
        PasswordHash, PasswordHasher as ArgonHasher, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};

use filecask_core::error::AppError;

/// Holds the Argon2id hash of the configured admin secret and verifies
/// supplied passwords against it.
///
/// The configured plaintext is hashed once at construction; every
/// comparison afterwards goes through Argon2's verifier, which is
/// constant-time with respect to the candidate password.
#[derive(Debug, Clone)]
pub struct SecretVerifier {
    /// PHC-string hash of the configured secret.
    hash: String,
}

impl SecretVerifier {
    /// Hashes the configured secret with a random salt.
    pub fn new(secret: &str) -> Result<Self, AppError> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        let hash = argon2
            .hash_password(secret.as_bytes(), &salt)
            .map_err(|e| AppError::internal(format!("Secret hashing failed: {e}")))?;

        Ok(Self {
            hash: hash.to_string(),
        })
    }

    /// Verifies a candidate password against the configured secret.
    ///
    /// Returns `Ok(true)` if it matches, `Ok(false)` if not.
    pub fn verify(&self, candidate: &str) -> Result<bool, AppError> {
        let parsed_hash = PasswordHash::new(&self.hash)
            .map_err(|e| AppError::internal(format!("Invalid secret hash format: {e}")))?;

        let argon2 = Argon2::default();
        match argon2.verify_password(candidate.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AppError::internal(format!(
                "Secret verification failed: {e}"
            ))),
        }
    }
}
