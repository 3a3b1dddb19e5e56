//! Request envelope and status ledger entries.
//!
//! A [`ServiceRequest`] is the shared envelope of all six variants. Its
//! `status` is a denormalised copy of the newest [`StatusLedgerEntry`] for
//! the same `(kind, id)`.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{RequestPayload, RequestStatus, ServiceKind, StudentId};

/// Identifier of a request, unique within its variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(i64);

impl RequestId {
    /// Wrap a raw identifier.
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Raw identifier value.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Snapshot of a stored request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceRequest {
    /// Request identifier.
    pub id: RequestId,
    /// Owning student.
    pub student_id: StudentId,
    /// Owning student's name at read time, for display.
    pub student_name: String,
    /// Current status.
    pub status: RequestStatus,
    /// Variant payload.
    pub payload: RequestPayload,
    /// Submission time.
    pub created_at: DateTime<Utc>,
    /// Time of the last status or flag change.
    pub updated_at: DateTime<Utc>,
}

impl ServiceRequest {
    /// Variant of the request.
    #[must_use]
    pub fn kind(&self) -> ServiceKind {
        self.payload.kind()
    }
}

/// Immutable record of one status value for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLedgerEntry {
    /// Entry identifier; increases with insertion order.
    pub id: i64,
    /// Variant of the request.
    pub kind: ServiceKind,
    /// Request the entry belongs to.
    pub request_id: RequestId,
    /// Status recorded.
    pub status: RequestStatus,
    /// Staff member or system that made the change.
    pub updated_by: Option<String>,
    /// Free-form note.
    pub notes: Option<String>,
    /// Time the entry was written.
    pub created_at: DateTime<Utc>,
}

/// Input for creating a request together with its initial ledger entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewServiceRequest {
    /// Owning student.
    pub student_id: StudentId,
    /// Validated payload; determines the variant.
    pub payload: RequestPayload,
    /// Note for the initial `pending` entry.
    pub notes: String,
    /// Submission time for the record and the entry.
    pub submitted_at: DateTime<Utc>,
}

impl NewServiceRequest {
    /// Prepare a submission with the variant's standard ledger note.
    #[must_use]
    pub fn submission(
        student_id: StudentId,
        payload: RequestPayload,
        submitted_at: DateTime<Utc>,
    ) -> Self {
        let notes = payload.kind().submission_note();
        Self {
            student_id,
            payload,
            notes,
            submitted_at,
        }
    }

    /// Variant being created.
    #[must_use]
    pub fn kind(&self) -> ServiceKind {
        self.payload.kind()
    }
}

/// Guarded status change applied with its ledger entry in one unit.
///
/// The change only applies while the stored status still equals
/// `expected`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange {
    /// Variant of the request.
    pub kind: ServiceKind,
    /// Request to change.
    pub request_id: RequestId,
    /// Status the caller validated against.
    pub expected: RequestStatus,
    /// Status to record.
    pub next: RequestStatus,
    /// Staff member making the change.
    pub updated_by: Option<String>,
    /// Free-form note.
    pub notes: Option<String>,
    /// Time of the change.
    pub changed_at: DateTime<Utc>,
}

/// Explicit update of the outing notification flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutingNotificationFlags {
    /// New value for `parent_notified`, if changing.
    pub parent_notified: Option<bool>,
    /// New value for `security_notified`, if changing.
    pub security_notified: Option<bool>,
}

impl OutingNotificationFlags {
    /// Whether no flag is being changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parent_notified.is_none() && self.security_notified.is_none()
    }

    /// Apply the flags to a payload. Returns `false` for non-outing payloads.
    pub fn apply_to(&self, payload: &mut RequestPayload) -> bool {
        let RequestPayload::Outing(details) = payload else {
            return false;
        };
        if let Some(flag) = self.parent_notified {
            details.parent_notified = flag;
        }
        if let Some(flag) = self.security_notified {
            details.security_notified = flag;
        }
        true
    }
}
