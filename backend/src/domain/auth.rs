//! Authentication primitives: login credentials and stored password hashes.
//!
//! Keep inbound payload parsing outside the domain by exposing constructors
//! that validate string inputs before a handler talks to a port or service.

use std::fmt;

use zeroize::Zeroizing;

use super::Student;

/// Domain error returned when login payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoginValidationError {
    /// Login identifier was missing or blank once trimmed.
    #[error("login id must not be empty")]
    EmptyLoginId,
    /// Password was blank.
    #[error("password must not be empty")]
    EmptyPassword,
}

impl LoginValidationError {
    /// Request field the error refers to.
    #[must_use]
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyLoginId => "login_id",
            Self::EmptyPassword => "password",
        }
    }
}

/// Validated login credentials used by the identity service.
///
/// The login identifier is matched against a student's roll number first and
/// their phone number second.
///
/// ## Invariants
/// - `login_id` is trimmed and must not be empty after trimming.
/// - `password` is required to be non-empty but retains caller-provided
///   whitespace to avoid surprising credential comparisons.
///
/// # Examples
/// ```
/// use campus_portal::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" 21CS001 ", "hunter2").unwrap();
/// assert_eq!(creds.login_id(), "21CS001");
/// assert_eq!(creds.password(), "hunter2");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    login_id: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw login id/password inputs.
    pub fn try_from_parts(login_id: &str, password: &str) -> Result<Self, LoginValidationError> {
        let normalized = login_id.trim();
        if normalized.is_empty() {
            return Err(LoginValidationError::EmptyLoginId);
        }

        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }

        Ok(Self {
            login_id: normalized.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Roll number or phone number supplied by the caller.
    #[must_use]
    pub fn login_id(&self) -> &str {
        self.login_id.as_str()
    }

    /// Password string provided by the caller.
    #[must_use]
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("login_id", &self.login_id)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Encoded password hash in PHC string format.
///
/// The debug representation is redacted so hashes never reach logs.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordDigest(String);

impl PasswordDigest {
    /// Wrap an encoded hash produced by a password hasher.
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// Encoded hash suitable for persistence.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for PasswordDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordDigest(<redacted>)")
    }
}

/// Student record paired with its stored password hash.
///
/// Only the identity service sees this type; it never leaves the domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCredentials {
    /// Account the hash belongs to.
    pub student: Student,
    /// Stored hash for verification.
    pub digest: PasswordDigest,
}
