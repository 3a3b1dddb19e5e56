//! Internal Diesel row structs for database operations.
//!
//! These types never leave the persistence layer. Conversion to domain
//! types happens in the repositories, where unknown discriminators or
//! undecodable payloads become query errors.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use super::schema::{request_status_entries, service_requests, students};

// ---------------------------------------------------------------------------
// Students
// ---------------------------------------------------------------------------

/// Row struct for reading from the students table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = students)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct StudentRow {
    pub id: i64,
    pub roll_number: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password_hash: String,
    pub emergency_contact: String,
    pub hostel_room: String,
    pub blood_group: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for new student records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = students)]
pub(crate) struct NewStudentRow<'a> {
    pub roll_number: &'a str,
    pub name: &'a str,
    pub email: &'a str,
    pub phone: &'a str,
    pub password_hash: &'a str,
    pub emergency_contact: &'a str,
    pub hostel_room: &'a str,
    pub blood_group: &'a str,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial profile update; `None` columns are left untouched.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = students)]
pub(crate) struct StudentProfileUpdate<'a> {
    pub name: Option<&'a str>,
    pub email: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub emergency_contact: Option<&'a str>,
    pub hostel_room: Option<&'a str>,
    pub blood_group: Option<&'a str>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Service requests
// ---------------------------------------------------------------------------

/// Row struct for reading from the service_requests table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = service_requests)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ServiceRequestRow {
    pub id: i64,
    pub kind: String,
    pub student_id: i64,
    pub status: String,
    pub payload: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for new request records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = service_requests)]
pub(crate) struct NewServiceRequestRow<'a> {
    pub kind: &'a str,
    pub student_id: i64,
    pub status: &'a str,
    pub payload: &'a serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Status ledger
// ---------------------------------------------------------------------------

/// Row struct for reading from the request_status_entries table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = request_status_entries)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct StatusEntryRow {
    pub id: i64,
    pub request_kind: String,
    pub request_id: i64,
    pub status: String,
    pub updated_by: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for ledger entries.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = request_status_entries)]
pub(crate) struct NewStatusEntryRow<'a> {
    pub request_kind: &'a str,
    pub request_id: i64,
    pub status: &'a str,
    pub updated_by: Option<&'a str>,
    pub notes: Option<&'a str>,
    pub created_at: DateTime<Utc>,
}
