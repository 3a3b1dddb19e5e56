//! Read port over the append-only status ledger.

use async_trait::async_trait;

use crate::domain::{RequestId, ServiceKind, StatusLedgerEntry};

use super::define_port_error;

define_port_error! {
    /// Errors raised by status ledger adapters.
    pub enum StatusLedgerError {
        /// Ledger store connection could not be established.
        Connection { message: String } =>
            "status ledger connection failed: {message}",
        /// Query failed during execution.
        Query { message: String } =>
            "status ledger query failed: {message}",
    }
}

/// Port for reading ledger entries. Entries are written only by
/// [`super::ServiceRequestRepository`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StatusLedgerRepository: Send + Sync {
    /// Entries for one request, newest first (ties by descending entry id).
    async fn history(
        &self,
        kind: ServiceKind,
        request_id: RequestId,
    ) -> Result<Vec<StatusLedgerEntry>, StatusLedgerError>;
}
