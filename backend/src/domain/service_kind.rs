//! Request variants and their status state machines.
//!
//! Every variant starts in [`RequestStatus::Pending`] and may only move
//! forward through its own ordered chain of stages; skipping stages is
//! allowed, staying put, going backwards or leaving a terminal stage is not.
//!
//! | Variant           | Stages                                          |
//! |-------------------|-------------------------------------------------|
//! | outing            | pending → approved or rejected                  |
//! | xerox, stationary | pending → processing → ready → completed        |
//! | mess              | pending → confirmed → prepared → delivered      |
//! | fivestar, ccd     | pending → confirmed → preparing → ready → delivered |

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::ValidationError;

/// One of the six request variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceKind {
    /// Leave-campus request approved by staff.
    Outing,
    /// Printing and photocopy order.
    Xerox,
    /// Mess meal booking.
    Mess,
    /// Restaurant food order.
    Fivestar,
    /// Coffee shop order.
    Ccd,
    /// Stationery order.
    Stationary,
}

impl ServiceKind {
    /// All variants in display order.
    pub const ALL: [Self; 6] = [
        Self::Outing,
        Self::Xerox,
        Self::Mess,
        Self::Fivestar,
        Self::Ccd,
        Self::Stationary,
    ];

    /// Stable lowercase tag used in paths, storage and the ledger.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Outing => "outing",
            Self::Xerox => "xerox",
            Self::Mess => "mess",
            Self::Fivestar => "fivestar",
            Self::Ccd => "ccd",
            Self::Stationary => "stationary",
        }
    }

    /// Human-facing name.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Outing => "Outing",
            Self::Xerox => "Xerox",
            Self::Mess => "Mess",
            Self::Fivestar => "Fivestar",
            Self::Ccd => "CCD",
            Self::Stationary => "Stationary",
        }
    }

    /// Ledger note written with the initial `pending` entry.
    ///
    /// # Examples
    /// ```
    /// use campus_portal::domain::ServiceKind;
    ///
    /// assert_eq!(ServiceKind::Ccd.submission_note(), "CCD request submitted");
    /// ```
    #[must_use]
    pub fn submission_note(self) -> String {
        format!("{} request submitted", self.display_name())
    }

    /// Statuses this variant may hold, in stage order.
    #[must_use]
    pub fn statuses(self) -> &'static [RequestStatus] {
        use RequestStatus as S;
        match self {
            Self::Outing => &[S::Pending, S::Approved, S::Rejected],
            Self::Xerox | Self::Stationary => &[S::Pending, S::Processing, S::Ready, S::Completed],
            Self::Mess => &[S::Pending, S::Confirmed, S::Prepared, S::Delivered],
            Self::Fivestar | Self::Ccd => {
                &[S::Pending, S::Confirmed, S::Preparing, S::Ready, S::Delivered]
            }
        }
    }

    fn stage(self, status: RequestStatus) -> Option<u8> {
        use RequestStatus as S;
        match (self, status) {
            (_, S::Pending) => Some(0),
            (Self::Outing, S::Approved | S::Rejected) => Some(1),
            (Self::Xerox | Self::Stationary, S::Processing) => Some(1),
            (Self::Xerox | Self::Stationary, S::Ready) => Some(2),
            (Self::Xerox | Self::Stationary, S::Completed) => Some(3),
            (Self::Mess | Self::Fivestar | Self::Ccd, S::Confirmed) => Some(1),
            (Self::Mess, S::Prepared) => Some(2),
            (Self::Mess, S::Delivered) => Some(3),
            (Self::Fivestar | Self::Ccd, S::Preparing) => Some(2),
            (Self::Fivestar | Self::Ccd, S::Ready) => Some(3),
            (Self::Fivestar | Self::Ccd, S::Delivered) => Some(4),
            _ => None,
        }
    }

    fn final_stage(self) -> u8 {
        match self {
            Self::Outing => 1,
            Self::Xerox | Self::Stationary | Self::Mess => 3,
            Self::Fivestar | Self::Ccd => 4,
        }
    }

    /// Whether `status` belongs to this variant.
    #[must_use]
    pub fn accepts(self, status: RequestStatus) -> bool {
        self.stage(status).is_some()
    }

    /// Whether no further transitions are possible from `status`.
    #[must_use]
    pub fn is_terminal(self, status: RequestStatus) -> bool {
        self.stage(status) == Some(self.final_stage())
    }

    /// Parse a raw status name and check it belongs to this variant.
    pub fn parse_status(self, raw: &str) -> Result<RequestStatus, ValidationError> {
        let status: RequestStatus = raw.parse().map_err(|_| {
            ValidationError::invalid("status", format!("'{}' is not a known status", raw.trim()))
        })?;
        if !self.accepts(status) {
            return Err(ValidationError::invalid(
                "status",
                format!("'{status}' is not a {} status", self.as_str()),
            ));
        }
        Ok(status)
    }

    /// Validate a transition between two statuses of this variant.
    ///
    /// # Examples
    /// ```
    /// use campus_portal::domain::{RequestStatus, ServiceKind};
    ///
    /// let kind = ServiceKind::Xerox;
    /// assert!(kind.check_transition(RequestStatus::Pending, RequestStatus::Completed).is_ok());
    /// assert!(kind.check_transition(RequestStatus::Completed, RequestStatus::Pending).is_err());
    /// ```
    pub fn check_transition(
        self,
        from: RequestStatus,
        to: RequestStatus,
    ) -> Result<(), ValidationError> {
        let target = self.stage(to).ok_or_else(|| {
            ValidationError::invalid("status", format!("'{to}' is not a {} status", self.as_str()))
        })?;
        let current = self.stage(from).ok_or_else(|| {
            ValidationError::invalid(
                "status",
                format!("current status '{from}' is not a {} status", self.as_str()),
            )
        })?;
        if current == self.final_stage() {
            return Err(ValidationError::invalid(
                "status",
                format!("'{from}' is final and cannot change"),
            ));
        }
        if target <= current {
            return Err(ValidationError::invalid(
                "status",
                format!("cannot move from '{from}' to '{to}'"),
            ));
        }
        Ok(())
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown variant tag.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown service kind: {0}")]
pub struct UnknownServiceKind(pub String);

impl From<UnknownServiceKind> for ValidationError {
    fn from(value: UnknownServiceKind) -> Self {
        ValidationError::invalid("kind", format!("'{}' is not a service kind", value.0))
    }
}

impl FromStr for ServiceKind {
    type Err = UnknownServiceKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| UnknownServiceKind(s.to_owned()))
    }
}

/// Every status any variant can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    /// Submitted, awaiting staff action.
    Pending,
    /// Outing approved.
    Approved,
    /// Outing rejected.
    Rejected,
    /// Order accepted by the desk (xerox, stationary).
    Processing,
    /// Order accepted by the kitchen (mess, fivestar, ccd).
    Confirmed,
    /// Mess meal prepared.
    Prepared,
    /// Food being prepared (fivestar, ccd).
    Preparing,
    /// Ready for pickup.
    Ready,
    /// Print or stationery order handed over.
    Completed,
    /// Food handed over.
    Delivered,
}

impl RequestStatus {
    const ALL: [Self; 10] = [
        Self::Pending,
        Self::Approved,
        Self::Rejected,
        Self::Processing,
        Self::Confirmed,
        Self::Prepared,
        Self::Preparing,
        Self::Ready,
        Self::Completed,
        Self::Delivered,
    ];

    /// Stable lowercase name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Processing => "processing",
            Self::Confirmed => "confirmed",
            Self::Prepared => "prepared",
            Self::Preparing => "preparing",
            Self::Ready => "ready",
            Self::Completed => "completed",
            Self::Delivered => "delivered",
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown status name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown request status: {0}")]
pub struct UnknownRequestStatus(pub String);

impl FromStr for RequestStatus {
    type Err = UnknownRequestStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| UnknownRequestStatus(s.to_owned()))
    }
}
