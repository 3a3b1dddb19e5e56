//! Student identity use-cases: registration, login, lookups and profile
//! edits.
//!
//! Uniqueness is checked up front so the caller learns the highest-priority
//! conflicting field (`student_id`, then `email`, then `phone`). A race lost
//! at the store surfaces as the same conflict via
//! [`StudentRepositoryError::Duplicate`].

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{debug, info};

use super::ports::{
    LoginService, PasswordHasher, PasswordHasherError, StudentCommand, StudentQuery,
    StudentRepository, StudentRepositoryError,
};
use super::{
    Error, LoginCredentials, NewStudent, ProfileChanges, Student, StudentId, StudentRegistration,
};

const INVALID_CREDENTIALS: &str = "invalid credentials";

/// Identity service backed by a student repository and a password hasher.
#[derive(Clone)]
pub struct IdentityService<R, H> {
    students: Arc<R>,
    hasher: Arc<H>,
    clock: Arc<dyn Clock>,
}

impl<R, H> IdentityService<R, H> {
    /// Create the service.
    pub fn new(students: Arc<R>, hasher: Arc<H>, clock: Arc<dyn Clock>) -> Self {
        Self {
            students,
            hasher,
            clock,
        }
    }
}

pub(crate) fn map_student_repository_error(error: StudentRepositoryError) -> Error {
    match error {
        StudentRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("student store unavailable: {message}"))
        }
        StudentRepositoryError::Query { message } => {
            Error::internal(format!("student store error: {message}"))
        }
        StudentRepositoryError::Duplicate { field } => field.conflict_error(),
    }
}

fn map_hasher_error(error: PasswordHasherError) -> Error {
    Error::internal(error.to_string())
}

fn not_found(id: StudentId) -> Error {
    Error::not_found(format!("student {id} not found"))
}

impl<R, H> IdentityService<R, H>
where
    R: StudentRepository,
    H: PasswordHasher,
{
    async fn existing(&self, id: StudentId) -> Result<Student, Error> {
        self.students
            .find_by_id(id)
            .await
            .map_err(map_student_repository_error)?
            .ok_or_else(|| not_found(id))
    }
}

#[async_trait]
impl<R, H> LoginService for IdentityService<R, H>
where
    R: StudentRepository,
    H: PasswordHasher,
{
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<Student, Error> {
        let stored = self
            .students
            .find_credentials(credentials.login_id())
            .await
            .map_err(map_student_repository_error)?;

        let Some(stored) = stored else {
            // Burn the same hashing cost as a real account.
            let decoy = self.hasher.decoy_digest();
            let _ = self.hasher.verify(credentials.password(), &decoy).await;
            debug!("login rejected: unknown login id");
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        };

        let verified = self
            .hasher
            .verify(credentials.password(), &stored.digest)
            .await
            .map_err(map_hasher_error)?;
        if !verified {
            debug!(student_id = %stored.student.id, "login rejected: wrong password");
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        }
        info!(student_id = %stored.student.id, "student logged in");
        Ok(stored.student)
    }
}

#[async_trait]
impl<R, H> StudentCommand for IdentityService<R, H>
where
    R: StudentRepository,
    H: PasswordHasher,
{
    async fn register(&self, registration: StudentRegistration) -> Result<Student, Error> {
        let probe = registration.uniqueness_probe();
        let existing = self
            .students
            .find_conflicts(&probe)
            .await
            .map_err(map_student_repository_error)?;
        if let Some(field) = probe.first_conflict(&existing, None) {
            return Err(field.conflict_error());
        }

        let digest = self
            .hasher
            .hash(registration.password())
            .await
            .map_err(map_hasher_error)?;
        let new_student = NewStudent::from_registration(&registration, digest, self.clock.utc());
        let student = self
            .students
            .insert(&new_student)
            .await
            .map_err(map_student_repository_error)?;
        info!(student_id = %student.id, roll_number = %student.roll_number, "student registered");
        Ok(student)
    }

    async fn update_profile(
        &self,
        id: StudentId,
        changes: ProfileChanges,
    ) -> Result<Student, Error> {
        self.existing(id).await?;

        let probe = changes.uniqueness_probe();
        if !probe.is_empty() {
            let existing = self
                .students
                .find_conflicts(&probe)
                .await
                .map_err(map_student_repository_error)?;
            if let Some(field) = probe.first_conflict(&existing, Some(id)) {
                return Err(field.conflict_error());
            }
        }

        let student = self
            .students
            .update_profile(id, &changes, self.clock.utc())
            .await
            .map_err(map_student_repository_error)?
            .ok_or_else(|| not_found(id))?;
        info!(student_id = %student.id, "student profile updated");
        Ok(student)
    }
}

#[async_trait]
impl<R, H> StudentQuery for IdentityService<R, H>
where
    R: StudentRepository,
    H: PasswordHasher,
{
    async fn get_student(&self, id: StudentId) -> Result<Student, Error> {
        self.existing(id).await
    }

    async fn list_students(&self) -> Result<Vec<Student>, Error> {
        self.students
            .list()
            .await
            .map_err(map_student_repository_error)
    }
}

#[cfg(test)]
#[path = "identity_service_tests.rs"]
mod tests;
