//! OpenAPI schema definitions for domain types.
//!
//! Domain types stay framework-agnostic by not deriving `ToSchema`. The
//! wrappers here mirror their serialised shape and live in the inbound
//! adapter where framework concerns belong.

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
#[derive(ToSchema)]
#[schema(as = ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request is malformed or fails validation.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// Authentication failed or is missing.
    #[schema(rename = "unauthorized")]
    Unauthorized,
    /// Authenticated but not permitted to perform this action.
    #[schema(rename = "forbidden")]
    Forbidden,
    /// The requested resource does not exist.
    #[schema(rename = "not_found")]
    NotFound,
    /// The request conflicts with existing state.
    #[schema(rename = "conflict")]
    Conflict,
    /// A backing store or gateway is temporarily unavailable.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    /// An unexpected error occurred on the server.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
#[derive(ToSchema)]
#[schema(as = Error, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    /// Stable machine-readable error code.
    #[schema(example = "conflict")]
    code: ErrorCodeSchema,
    /// Human-readable message returned to clients.
    #[schema(example = "email already registered")]
    message: String,
    /// Correlation identifier, echoed in the `trace-id` header.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    trace_id: Option<String>,
    /// Offending field and a machine-readable reason, when applicable.
    #[schema(example = json!({"field": "email", "code": "duplicate_email"}))]
    details: Option<serde_json::Value>,
}

/// OpenAPI schema for [`crate::domain::ServiceKind`].
#[derive(ToSchema)]
#[schema(as = ServiceKind)]
pub enum ServiceKindSchema {
    #[schema(rename = "outing")]
    Outing,
    #[schema(rename = "xerox")]
    Xerox,
    #[schema(rename = "mess")]
    Mess,
    #[schema(rename = "fivestar")]
    Fivestar,
    #[schema(rename = "ccd")]
    Ccd,
    #[schema(rename = "stationary")]
    Stationary,
}

/// OpenAPI schema for [`crate::domain::RequestStatus`].
#[derive(ToSchema)]
#[schema(as = RequestStatus)]
pub enum RequestStatusSchema {
    #[schema(rename = "pending")]
    Pending,
    #[schema(rename = "approved")]
    Approved,
    #[schema(rename = "rejected")]
    Rejected,
    #[schema(rename = "processing")]
    Processing,
    #[schema(rename = "confirmed")]
    Confirmed,
    #[schema(rename = "prepared")]
    Prepared,
    #[schema(rename = "preparing")]
    Preparing,
    #[schema(rename = "ready")]
    Ready,
    #[schema(rename = "completed")]
    Completed,
    #[schema(rename = "delivered")]
    Delivered,
}
