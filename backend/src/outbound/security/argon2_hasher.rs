//! Argon2id password hashing adapter.
//!
//! Hashing is CPU-bound, so both operations run on Tokio's blocking pool.

use argon2::password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString};
use argon2::Argon2;
use async_trait::async_trait;
use rand::rngs::OsRng;
use zeroize::Zeroizing;

use crate::domain::PasswordDigest;
use crate::domain::ports::{PasswordHasher, PasswordHasherError};

/// Password hasher producing Argon2id PHC strings with default parameters.
#[derive(Debug, Clone)]
pub struct Argon2PasswordHasher {
    decoy: PasswordDigest,
}

impl Argon2PasswordHasher {
    /// Build a hasher, deriving the decoy digest used for unknown accounts.
    ///
    /// # Errors
    ///
    /// Returns [`PasswordHasherError::Hash`] when the decoy cannot be hashed.
    pub fn new() -> Result<Self, PasswordHasherError> {
        let decoy_secret = SaltString::generate(&mut OsRng);
        let decoy = hash_blocking(decoy_secret.as_str())?;
        Ok(Self { decoy })
    }
}

fn hash_blocking(password: &str) -> Result<PasswordDigest, PasswordHasherError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| PasswordDigest::new(hash.to_string()))
        .map_err(|err| PasswordHasherError::hash(err.to_string()))
}

fn verify_blocking(password: &str, encoded: &str) -> Result<bool, PasswordHasherError> {
    let parsed = PasswordHash::new(encoded)
        .map_err(|err| PasswordHasherError::malformed_digest(err.to_string()))?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(err) => Err(PasswordHasherError::hash(err.to_string())),
    }
}

fn join_error(err: tokio::task::JoinError) -> PasswordHasherError {
    PasswordHasherError::hash(format!("hashing task aborted: {err}"))
}

#[async_trait]
impl PasswordHasher for Argon2PasswordHasher {
    async fn hash(&self, password: &str) -> Result<PasswordDigest, PasswordHasherError> {
        let password = Zeroizing::new(password.to_owned());
        tokio::task::spawn_blocking(move || hash_blocking(password.as_str()))
            .await
            .map_err(join_error)?
    }

    async fn verify(
        &self,
        password: &str,
        digest: &PasswordDigest,
    ) -> Result<bool, PasswordHasherError> {
        let password = Zeroizing::new(password.to_owned());
        let encoded = digest.as_str().to_owned();
        tokio::task::spawn_blocking(move || verify_blocking(password.as_str(), &encoded))
            .await
            .map_err(join_error)?
    }

    fn decoy_digest(&self) -> PasswordDigest {
        self.decoy.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn hasher() -> Argon2PasswordHasher {
        Argon2PasswordHasher::new().expect("decoy hashes")
    }

    #[rstest]
    #[tokio::test]
    async fn hashes_verify_against_the_original_password(hasher: Argon2PasswordHasher) {
        let digest = hasher.hash("hunter2").await.expect("hashes");
        assert!(digest.as_str().starts_with("$argon2id$"));
        assert!(hasher.verify("hunter2", &digest).await.expect("verifies"));
        assert!(!hasher.verify("hunter3", &digest).await.expect("verifies"));
    }

    #[rstest]
    #[tokio::test]
    async fn identical_passwords_get_distinct_salts(hasher: Argon2PasswordHasher) {
        let first = hasher.hash("same").await.expect("hashes");
        let second = hasher.hash("same").await.expect("hashes");
        assert_ne!(first, second);
    }

    #[rstest]
    #[tokio::test]
    async fn malformed_digests_are_reported(hasher: Argon2PasswordHasher) {
        let err = hasher
            .verify("hunter2", &PasswordDigest::new("not-a-phc-string"))
            .await
            .expect_err("rejected");
        assert!(matches!(err, PasswordHasherError::MalformedDigest { .. }));
    }

    #[rstest]
    #[tokio::test]
    async fn the_decoy_rejects_ordinary_passwords(hasher: Argon2PasswordHasher) {
        let decoy = hasher.decoy_digest();
        assert!(!hasher.verify("", &decoy).await.expect("verifies"));
        assert!(!hasher.verify("password", &decoy).await.expect("verifies"));
    }
}
