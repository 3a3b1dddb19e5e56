//! Port for one-way password hashing.

use async_trait::async_trait;

use crate::domain::PasswordDigest;

use super::define_port_error;

define_port_error! {
    /// Errors raised by password hashing adapters.
    pub enum PasswordHasherError {
        /// Hashing failed.
        Hash { message: String } => "password hashing failed: {message}",
        /// The stored hash could not be parsed.
        MalformedDigest { message: String } => "stored password hash is malformed: {message}",
    }
}

/// Port for salted password hashing and verification.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PasswordHasher: Send + Sync {
    /// Hash a plaintext password with a fresh salt.
    async fn hash(&self, password: &str) -> Result<PasswordDigest, PasswordHasherError>;

    /// Check a plaintext password against a stored hash.
    async fn verify(
        &self,
        password: &str,
        digest: &PasswordDigest,
    ) -> Result<bool, PasswordHasherError>;

    /// Hash that never verifies, used to equalise timing for unknown logins.
    fn decoy_digest(&self) -> PasswordDigest;
}
