//! Port for student account persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    NewStudent, ProfileChanges, StoredCredentials, Student, StudentId, UniqueStudentField,
    UniquenessProbe,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by student repository adapters.
    pub enum StudentRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "student repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "student repository query failed: {message}",
        /// A unique field was taken by a concurrent write.
        Duplicate { field: UniqueStudentField } =>
            "student {field} already registered",
    }
}

/// Port for reading and writing student accounts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StudentRepository: Send + Sync {
    /// Store a new account and return it with its assigned id.
    async fn insert(&self, student: &NewStudent) -> Result<Student, StudentRepositoryError>;

    /// Find an account by id.
    async fn find_by_id(&self, id: StudentId) -> Result<Option<Student>, StudentRepositoryError>;

    /// Find credentials for a login id, trying roll number then phone.
    async fn find_credentials(
        &self,
        login_id: &str,
    ) -> Result<Option<StoredCredentials>, StudentRepositoryError>;

    /// Accounts sharing any probed unique value.
    async fn find_conflicts(
        &self,
        probe: &UniquenessProbe,
    ) -> Result<Vec<Student>, StudentRepositoryError>;

    /// All accounts, newest first.
    async fn list(&self) -> Result<Vec<Student>, StudentRepositoryError>;

    /// Number of stored accounts.
    async fn count(&self) -> Result<u64, StudentRepositoryError>;

    /// Apply profile changes; `None` when the account does not exist.
    async fn update_profile(
        &self,
        id: StudentId,
        changes: &ProfileChanges,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Student>, StudentRepositoryError>;
}
