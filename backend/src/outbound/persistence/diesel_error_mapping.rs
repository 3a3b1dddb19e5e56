//! Shared Diesel error mapping for the portal repositories.
//!
//! SQL text and driver messages are logged at debug level and never copied
//! into the errors handed back to the domain.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::pool::PoolError;

/// Constraint violations the repositories translate into domain errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum ConstraintViolation {
    /// A unique constraint rejected the write.
    Unique { constraint: Option<String> },
    /// A foreign key constraint rejected the write.
    ForeignKey { constraint: Option<String> },
}

/// Classify a Diesel error as a constraint violation, if it is one.
pub(super) fn constraint_violation(error: &DieselError) -> Option<ConstraintViolation> {
    let DieselError::DatabaseError(kind, info) = error else {
        return None;
    };
    let constraint = info.constraint_name().map(str::to_owned);
    match kind {
        DatabaseErrorKind::UniqueViolation => Some(ConstraintViolation::Unique { constraint }),
        DatabaseErrorKind::ForeignKeyViolation => {
            Some(ConstraintViolation::ForeignKey { constraint })
        }
        _ => None,
    }
}

/// Map pool errors into a repository-specific connection error.
pub(super) fn map_pool_error<E>(error: PoolError, connection: impl FnOnce(String) -> E) -> E {
    connection(error.message().to_owned())
}

/// Map Diesel errors into query or connection constructors.
pub(super) fn map_diesel_error<E>(
    error: DieselError,
    query: impl FnOnce(&'static str) -> E,
    connection: impl FnOnce(&'static str) -> E,
) -> E {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        other => debug!(error = %other, "diesel operation failed"),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _)
        | DieselError::BrokenTransactionManager => connection("database connection error"),
        DieselError::NotFound => query("record not found"),
        DieselError::QueryBuilderError(_) => query("database query error"),
        DieselError::DeserializationError(_) | DieselError::SerializationError(_) => {
            query("database value conversion error")
        }
        _ => query("database error"),
    }
}
