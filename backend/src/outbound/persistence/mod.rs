//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the student, request and ledger ports backed
//! by PostgreSQL through `diesel-async` and a `bb8` pool.
//!
//! - **Thin adapters**: repositories only translate between Diesel rows and
//!   domain types. Validation and transition rules stay in the domain.
//! - **Internal models**: row structs (`models.rs`) and table definitions
//!   (`schema.rs`) never leave this module.
//! - **Atomic status writes**: request status and its ledger entry are
//!   written in one transaction.
//!
//! # Example
//!
//! ```ignore
//! use campus_portal::outbound::persistence::{DbPool, DieselStudentRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/portal")).await?;
//! let students = DieselStudentRepository::new(pool);
//! ```

mod diesel_error_mapping;
mod diesel_service_request_repository;
mod diesel_student_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_service_request_repository::{
    DieselServiceRequestRepository, DieselStatusLedgerRepository,
};
pub use diesel_student_repository::DieselStudentRepository;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
