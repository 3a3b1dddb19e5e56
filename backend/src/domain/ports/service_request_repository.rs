//! Port for request records and the writes that must accompany them.
//!
//! Every method that changes a record's status also appends the matching
//! ledger entry in the same unit of work, so adapters own atomicity.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    NewServiceRequest, OutingNotificationFlags, RequestId, RequestStatus, ServiceKind,
    ServiceRequest, StatusChange, StudentId,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by request repository adapters.
    pub enum ServiceRequestRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "service request repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "service request repository query failed: {message}",
        /// The owning student disappeared before the insert committed.
        StudentMissing { student_id: StudentId } =>
            "student {student_id} does not exist",
    }
}

/// Selection for per-variant record counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestCountFilter {
    /// Records currently holding the status.
    InStatus(RequestStatus),
    /// Records created in the half-open range `[from, until)`.
    CreatedBetween {
        /// Inclusive lower bound.
        from: DateTime<Utc>,
        /// Exclusive upper bound.
        until: DateTime<Utc>,
    },
}

/// Port for request records of all variants.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ServiceRequestRepository: Send + Sync {
    /// Insert a record with status `pending` together with its initial ledger
    /// entry. Both writes commit or neither does.
    async fn create(
        &self,
        request: &NewServiceRequest,
    ) -> Result<ServiceRequest, ServiceRequestRepositoryError>;

    /// Find a record by variant and id.
    async fn find(
        &self,
        kind: ServiceKind,
        id: RequestId,
    ) -> Result<Option<ServiceRequest>, ServiceRequestRepositoryError>;

    /// Records of a variant, newest first (ties by descending id), optionally
    /// restricted to one student.
    async fn list(
        &self,
        kind: ServiceKind,
        student_id: Option<StudentId>,
    ) -> Result<Vec<ServiceRequest>, ServiceRequestRepositoryError>;

    /// Apply a status change and append its ledger entry atomically.
    ///
    /// Returns `None` without writing when the record is missing or its
    /// status no longer equals `change.expected`.
    async fn apply_status_change(
        &self,
        change: &StatusChange,
    ) -> Result<Option<ServiceRequest>, ServiceRequestRepositoryError>;

    /// Update the outing notification flags; `None` when no such outing.
    async fn set_outing_flags(
        &self,
        id: RequestId,
        flags: &OutingNotificationFlags,
        changed_at: DateTime<Utc>,
    ) -> Result<Option<ServiceRequest>, ServiceRequestRepositoryError>;

    /// Count records per variant matching the filter. Variants without
    /// matches may be omitted.
    async fn count_by_kind(
        &self,
        filter: &RequestCountFilter,
    ) -> Result<BTreeMap<ServiceKind, u64>, ServiceRequestRepositoryError>;
}
