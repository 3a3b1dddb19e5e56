//! Driving ports for student identity use-cases.
//!
//! Inbound adapters call these to register, authenticate and look up
//! students without knowing the backing infrastructure.

use async_trait::async_trait;

use crate::domain::{Error, LoginCredentials, ProfileChanges, Student, StudentId, StudentRegistration};

/// Domain use-case port for authentication.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Validate credentials and return the authenticated student.
    ///
    /// Unknown login ids and wrong passwords fail with the same
    /// `unauthorized` error.
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<Student, Error>;
}

/// Domain use-case port for account writes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StudentCommand: Send + Sync {
    /// Register a new account.
    async fn register(&self, registration: StudentRegistration) -> Result<Student, Error>;

    /// Change profile fields of an existing account.
    async fn update_profile(
        &self,
        id: StudentId,
        changes: ProfileChanges,
    ) -> Result<Student, Error>;
}

/// Domain use-case port for account reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StudentQuery: Send + Sync {
    /// Fetch one account.
    async fn get_student(&self, id: StudentId) -> Result<Student, Error>;

    /// All accounts, newest first.
    async fn list_students(&self) -> Result<Vec<Student>, Error>;
}
