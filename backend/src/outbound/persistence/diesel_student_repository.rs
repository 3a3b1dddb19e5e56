//! PostgreSQL-backed `StudentRepository` implementation using Diesel ORM.
//!
//! Unique constraint violations are mapped back to the field they protect by
//! constraint name, so a registration race lost at the database reports the
//! same conflict as the service's up-front check.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{StudentRepository, StudentRepositoryError};
use crate::domain::{
    NewStudent, PasswordDigest, ProfileChanges, StoredCredentials, Student, StudentId,
    UniqueStudentField, UniquenessProbe,
};

use super::diesel_error_mapping::{ConstraintViolation, constraint_violation};
use super::models::{NewStudentRow, StudentProfileUpdate, StudentRow};
use super::pool::{DbPool, PoolError};
use super::schema::students;

/// Diesel-backed implementation of the student repository port.
#[derive(Clone)]
pub struct DieselStudentRepository {
    pool: DbPool,
}

impl DieselStudentRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> StudentRepositoryError {
    super::diesel_error_mapping::map_pool_error(error, StudentRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> StudentRepositoryError {
    if let Some(ConstraintViolation::Unique { constraint }) = constraint_violation(&error) {
        if let Some(field) = unique_field(constraint.as_deref()) {
            return StudentRepositoryError::duplicate(field);
        }
    }
    super::diesel_error_mapping::map_diesel_error(
        error,
        StudentRepositoryError::query,
        StudentRepositoryError::connection,
    )
}

fn unique_field(constraint: Option<&str>) -> Option<UniqueStudentField> {
    match constraint? {
        "students_roll_number_key" => Some(UniqueStudentField::RollNumber),
        "students_email_key" => Some(UniqueStudentField::Email),
        "students_phone_key" => Some(UniqueStudentField::Phone),
        _ => None,
    }
}

fn row_to_student(row: StudentRow) -> Student {
    Student {
        id: StudentId::new(row.id),
        roll_number: row.roll_number,
        name: row.name,
        email: row.email,
        phone: row.phone,
        emergency_contact: row.emergency_contact,
        hostel_room: row.hostel_room,
        blood_group: row.blood_group,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

fn row_to_credentials(mut row: StudentRow) -> StoredCredentials {
    let digest = PasswordDigest::new(std::mem::take(&mut row.password_hash));
    StoredCredentials {
        student: row_to_student(row),
        digest,
    }
}

#[async_trait]
impl StudentRepository for DieselStudentRepository {
    async fn insert(&self, student: &NewStudent) -> Result<Student, StudentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewStudentRow {
            roll_number: &student.roll_number,
            name: &student.name,
            email: &student.email,
            phone: &student.phone,
            password_hash: student.digest.as_str(),
            emergency_contact: &student.emergency_contact,
            hostel_room: &student.hostel_room,
            blood_group: &student.blood_group,
            created_at: student.created_at,
            updated_at: student.created_at,
        };

        diesel::insert_into(students::table)
            .values(&row)
            .returning(StudentRow::as_returning())
            .get_result(&mut conn)
            .await
            .map(row_to_student)
            .map_err(map_diesel_error)
    }

    async fn find_by_id(&self, id: StudentId) -> Result<Option<Student>, StudentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = students::table
            .find(id.get())
            .select(StudentRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(row_to_student))
    }

    async fn find_credentials(
        &self,
        login_id: &str,
    ) -> Result<Option<StoredCredentials>, StudentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let by_roll = students::table
            .filter(students::roll_number.eq(login_id))
            .select(StudentRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        if let Some(row) = by_roll {
            return Ok(Some(row_to_credentials(row)));
        }

        let by_phone = students::table
            .filter(students::phone.eq(login_id))
            .select(StudentRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(by_phone.map(row_to_credentials))
    }

    async fn find_conflicts(
        &self,
        probe: &UniquenessProbe,
    ) -> Result<Vec<Student>, StudentRepositoryError> {
        if probe.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let mut query = students::table.into_boxed();
        if let Some(roll_number) = probe.roll_number.as_deref() {
            query = query.or_filter(students::roll_number.eq(roll_number));
        }
        if let Some(email) = probe.email.as_deref() {
            query = query.or_filter(students::email.eq(email));
        }
        if let Some(phone) = probe.phone.as_deref() {
            query = query.or_filter(students::phone.eq(phone));
        }

        let rows: Vec<StudentRow> = query
            .select(StudentRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(row_to_student).collect())
    }

    async fn list(&self) -> Result<Vec<Student>, StudentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<StudentRow> = students::table
            .order((students::created_at.desc(), students::id.desc()))
            .select(StudentRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(row_to_student).collect())
    }

    async fn count(&self) -> Result<u64, StudentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let total: i64 = students::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        u64::try_from(total)
            .map_err(|_| StudentRepositoryError::query("student count is negative"))
    }

    async fn update_profile(
        &self,
        id: StudentId,
        changes: &ProfileChanges,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Student>, StudentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let update = StudentProfileUpdate {
            name: changes.name.as_deref(),
            email: changes.email.as_deref(),
            phone: changes.phone.as_deref(),
            emergency_contact: changes.emergency_contact.as_deref(),
            hostel_room: changes.hostel_room.as_deref(),
            blood_group: changes.blood_group.as_deref(),
            updated_at,
        };

        let row = diesel::update(students::table.find(id.get()))
            .set(&update)
            .returning(StudentRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(row_to_student))
    }
}
