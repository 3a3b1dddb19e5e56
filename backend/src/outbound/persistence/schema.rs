//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Student accounts. `roll_number`, `email` and `phone` carry unique
    /// constraints named `students_<column>_key`.
    students (id) {
        id -> Int8,
        roll_number -> Varchar,
        name -> Varchar,
        email -> Varchar,
        phone -> Varchar,
        /// Argon2id PHC string.
        password_hash -> Text,
        emergency_contact -> Varchar,
        hostel_room -> Varchar,
        blood_group -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Requests of every variant, discriminated by `kind`.
    service_requests (id) {
        id -> Int8,
        kind -> Varchar,
        student_id -> Int8,
        /// Copy of the newest ledger status.
        status -> Varchar,
        /// Variant fields as a JSON object.
        payload -> Jsonb,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Append-only status history.
    request_status_entries (id) {
        id -> Int8,
        request_kind -> Varchar,
        request_id -> Int8,
        status -> Varchar,
        updated_by -> Nullable<Varchar>,
        notes -> Nullable<Text>,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(service_requests -> students (student_id));
diesel::joinable!(request_status_entries -> service_requests (request_id));

diesel::allow_tables_to_appear_in_same_query!(students, service_requests, request_status_entries);
