//! Driving port for request reads.

use async_trait::async_trait;

use crate::domain::{Error, RequestId, ServiceKind, ServiceRequest, StatusLedgerEntry, StudentId};

/// Domain use-case port for reading requests and their history.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ServiceRequestQuery: Send + Sync {
    /// Fetch one request.
    async fn get_request(&self, kind: ServiceKind, id: RequestId) -> Result<ServiceRequest, Error>;

    /// Requests of a variant, newest first, optionally for one student.
    async fn list_requests(
        &self,
        kind: ServiceKind,
        student_id: Option<StudentId>,
    ) -> Result<Vec<ServiceRequest>, Error>;

    /// Ledger entries of a request, newest first.
    async fn status_history(
        &self,
        kind: ServiceKind,
        id: RequestId,
    ) -> Result<Vec<StatusLedgerEntry>, Error>;
}
