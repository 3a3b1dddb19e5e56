//! Request lifecycle shared by all six service variants.
//!
//! Creation and status changes are single repository calls so the record
//! and its ledger entry are written together. Status changes are guarded by
//! the status the transition was validated against; a concurrent writer
//! forces a re-read and re-validation, bounded by [`STATUS_UPDATE_ATTEMPTS`].

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{debug, info, warn};

use super::identity_service::map_student_repository_error;
use super::ports::{
    ServiceRequestCommand, ServiceRequestQuery, ServiceRequestRepository,
    ServiceRequestRepositoryError, StatusLedgerError, StatusLedgerRepository, StatusUpdate,
    StudentRepository,
};
use super::validation::optional_text;
use super::{
    Error, NewServiceRequest, NotificationDispatcher, OutingNotificationFlags, RequestDraft,
    RequestId, ServiceKind, ServiceRequest, StatusChange, StatusLedgerEntry, StudentId,
    ValidationError,
};

/// Upper bound on compare-and-set rounds for one status update.
pub const STATUS_UPDATE_ATTEMPTS: usize = 3;

/// Request service over the student, request and ledger stores.
#[derive(Clone)]
pub struct ServiceRequestService<S, R, L> {
    students: Arc<S>,
    requests: Arc<R>,
    ledger: Arc<L>,
    notifications: NotificationDispatcher,
    clock: Arc<dyn Clock>,
}

impl<S, R, L> ServiceRequestService<S, R, L> {
    /// Create the service.
    pub fn new(
        students: Arc<S>,
        requests: Arc<R>,
        ledger: Arc<L>,
        notifications: NotificationDispatcher,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            students,
            requests,
            ledger,
            notifications,
            clock,
        }
    }
}

pub(crate) fn map_request_repository_error(error: ServiceRequestRepositoryError) -> Error {
    match error {
        ServiceRequestRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("request store unavailable: {message}"))
        }
        ServiceRequestRepositoryError::Query { message } => {
            Error::internal(format!("request store error: {message}"))
        }
        ServiceRequestRepositoryError::StudentMissing { student_id } => {
            student_not_found(student_id)
        }
    }
}

fn map_ledger_error(error: StatusLedgerError) -> Error {
    match error {
        StatusLedgerError::Connection { message } => {
            Error::service_unavailable(format!("status ledger unavailable: {message}"))
        }
        StatusLedgerError::Query { message } => {
            Error::internal(format!("status ledger error: {message}"))
        }
    }
}

fn student_not_found(id: StudentId) -> Error {
    Error::not_found(format!("student {id} not found"))
}

fn request_not_found(kind: ServiceKind, id: RequestId) -> Error {
    Error::not_found(format!("{} request {id} not found", kind.as_str()))
}

fn stale_status(kind: ServiceKind, id: RequestId) -> Error {
    Error::conflict(format!(
        "{} request {id} was changed concurrently; retry",
        kind.as_str()
    ))
    .with_details(json!({ "field": "status", "code": "concurrent_update" }))
}

impl<S, R, L> ServiceRequestService<S, R, L>
where
    S: StudentRepository,
    R: ServiceRequestRepository,
    L: StatusLedgerRepository,
{
    async fn existing(&self, kind: ServiceKind, id: RequestId) -> Result<ServiceRequest, Error> {
        self.requests
            .find(kind, id)
            .await
            .map_err(map_request_repository_error)?
            .ok_or_else(|| request_not_found(kind, id))
    }
}

#[async_trait]
impl<S, R, L> ServiceRequestCommand for ServiceRequestService<S, R, L>
where
    S: StudentRepository,
    R: ServiceRequestRepository,
    L: StatusLedgerRepository,
{
    async fn create_request(
        &self,
        kind: ServiceKind,
        student_id: StudentId,
        draft: &RequestDraft,
    ) -> Result<ServiceRequest, Error> {
        self.students
            .find_by_id(student_id)
            .await
            .map_err(map_student_repository_error)?
            .ok_or_else(|| student_not_found(student_id))?;

        let payload = draft.validate(kind)?;
        let submission = NewServiceRequest::submission(student_id, payload, self.clock.utc());
        let created = self
            .requests
            .create(&submission)
            .await
            .map_err(map_request_repository_error)?;
        info!(
            kind = %kind,
            request_id = %created.id,
            student_id = %student_id,
            "service request created"
        );

        let _ = self.notifications.request_submitted(&created);
        Ok(created)
    }

    async fn update_status(
        &self,
        kind: ServiceKind,
        id: RequestId,
        update: &StatusUpdate,
    ) -> Result<ServiceRequest, Error> {
        let updated_by = optional_text(update.updated_by.as_deref());
        let notes = optional_text(update.notes.as_deref());

        for attempt in 1..=STATUS_UPDATE_ATTEMPTS {
            let current = self.existing(kind, id).await?;
            let next = kind.parse_status(&update.status)?;
            kind.check_transition(current.status, next)?;

            let change = StatusChange {
                kind,
                request_id: id,
                expected: current.status,
                next,
                updated_by: updated_by.clone(),
                notes: notes.clone(),
                changed_at: self.clock.utc(),
            };
            if let Some(updated) = self
                .requests
                .apply_status_change(&change)
                .await
                .map_err(map_request_repository_error)?
            {
                info!(
                    kind = %kind,
                    request_id = %id,
                    from = %current.status,
                    to = %next,
                    "request status updated"
                );
                return Ok(updated);
            }
            debug!(kind = %kind, request_id = %id, attempt, "stale status; re-reading request");
        }

        warn!(kind = %kind, request_id = %id, "status update abandoned after repeated conflicts");
        Err(stale_status(kind, id))
    }

    async fn set_outing_notifications(
        &self,
        id: RequestId,
        flags: OutingNotificationFlags,
    ) -> Result<ServiceRequest, Error> {
        if flags.is_empty() {
            return Err(ValidationError::invalid(
                "notifications",
                "supply parentNotified or securityNotified",
            )
            .into());
        }
        let updated = self
            .requests
            .set_outing_flags(id, &flags, self.clock.utc())
            .await
            .map_err(map_request_repository_error)?
            .ok_or_else(|| request_not_found(ServiceKind::Outing, id))?;
        info!(
            request_id = %id,
            parent_notified = ?flags.parent_notified,
            security_notified = ?flags.security_notified,
            "outing notification flags updated"
        );
        Ok(updated)
    }
}

#[async_trait]
impl<S, R, L> ServiceRequestQuery for ServiceRequestService<S, R, L>
where
    S: StudentRepository,
    R: ServiceRequestRepository,
    L: StatusLedgerRepository,
{
    async fn get_request(&self, kind: ServiceKind, id: RequestId) -> Result<ServiceRequest, Error> {
        self.existing(kind, id).await
    }

    async fn list_requests(
        &self,
        kind: ServiceKind,
        student_id: Option<StudentId>,
    ) -> Result<Vec<ServiceRequest>, Error> {
        self.requests
            .list(kind, student_id)
            .await
            .map_err(map_request_repository_error)
    }

    async fn status_history(
        &self,
        kind: ServiceKind,
        id: RequestId,
    ) -> Result<Vec<StatusLedgerEntry>, Error> {
        self.existing(kind, id).await?;
        self.ledger
            .history(kind, id)
            .await
            .map_err(map_ledger_error)
    }
}

#[cfg(test)]
#[path = "request_service_tests.rs"]
mod tests;
