//! Driving port for request writes.

use async_trait::async_trait;

use crate::domain::{
    Error, OutingNotificationFlags, RequestDraft, RequestId, ServiceKind, ServiceRequest,
    StudentId,
};

/// Raw status update as submitted by staff.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusUpdate {
    /// Requested status name; validated against the variant.
    pub status: String,
    /// Staff member making the change.
    pub updated_by: Option<String>,
    /// Free-form note.
    pub notes: Option<String>,
}

/// Domain use-case port for creating requests and changing their state.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ServiceRequestCommand: Send + Sync {
    /// Submit a request on behalf of `student_id`.
    async fn create_request(
        &self,
        kind: ServiceKind,
        student_id: StudentId,
        draft: &RequestDraft,
    ) -> Result<ServiceRequest, Error>;

    /// Move a request to a new status and record it in the ledger.
    async fn update_status(
        &self,
        kind: ServiceKind,
        id: RequestId,
        update: &StatusUpdate,
    ) -> Result<ServiceRequest, Error>;

    /// Set the outing notification flags explicitly.
    async fn set_outing_notifications(
        &self,
        id: RequestId,
        flags: OutingNotificationFlags,
    ) -> Result<ServiceRequest, Error>;
}
