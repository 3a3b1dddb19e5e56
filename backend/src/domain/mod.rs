//! Domain primitives, aggregates and services.
//!
//! Purpose: define strongly typed campus portal entities and the use-cases
//! that operate on them. Infrastructure is reached only through the traits
//! in [`ports`].
//!
//! Public surface:
//! - Error (alias to `error::Error`): API error response payload.
//! - Student, StudentRegistration, ProfileChanges: identity records.
//! - ServiceKind, RequestStatus: the six variants and their state machines.
//! - ServiceRequest, RequestPayload, StatusLedgerEntry: request records.
//! - IdentityService, ServiceRequestService, DashboardService,
//!   NotificationService: driving port implementations.

pub mod auth;
pub mod dashboard;
pub mod error;
pub mod identity_service;
pub mod notification;
pub mod ports;
pub mod request_payload;
pub mod request_service;
pub mod service_kind;
pub mod service_request;
pub mod student;
pub mod trace_id;
pub mod validation;

pub use self::auth::{LoginCredentials, LoginValidationError, PasswordDigest, StoredCredentials};
pub use self::dashboard::{DashboardService, DashboardSnapshot, ServiceTally};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::identity_service::IdentityService;
pub use self::notification::{
    NotificationDispatcher, NotificationDisposition, NotificationMessage, NotificationReceipt,
    NotificationService, ServiceContacts,
};
pub use self::request_payload::{
    CafeOrder, ItemOrder, MessBooking, OutingDetails, RequestDraft, RequestPayload, XeroxOrder,
};
pub use self::request_service::{STATUS_UPDATE_ATTEMPTS, ServiceRequestService};
pub use self::service_kind::{
    RequestStatus, ServiceKind, UnknownRequestStatus, UnknownServiceKind,
};
pub use self::service_request::{
    NewServiceRequest, OutingNotificationFlags, RequestId, ServiceRequest, StatusChange,
    StatusLedgerEntry,
};
pub use self::student::{
    NewStudent, ProfileChanges, ProfileDraft, Student, StudentDraft, StudentId,
    StudentRegistration, UniqueStudentField, UniquenessProbe,
};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::validation::ValidationError;

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use campus_portal::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::not_found("no such request"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
