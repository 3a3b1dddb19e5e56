//! Service request API handlers.
//!
//! ```text
//! POST /api/v1/requests/{kind}                 {"service_type":"b&w","pages":10,...}
//! GET  /api/v1/requests/{kind}?studentId=7
//! GET  /api/v1/requests/{kind}/{id}
//! PUT  /api/v1/requests/{kind}/{id}/status     {"status":"processing","updatedBy":"desk"}
//! GET  /api/v1/requests/{kind}/{id}/history
//! PUT  /api/v1/requests/outing/{id}/notifications {"parentNotified":true}
//! ```
//!
//! `{kind}` is one of `outing`, `xerox`, `mess`, `fivestar`, `ccd` or
//! `stationary`. Variant fields travel in snake_case; camelCase aliases are
//! accepted on input.

use actix_web::{HttpResponse, get, post, put, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::error;
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::StatusUpdate;
use crate::domain::{
    ApiResult, Error, OutingNotificationFlags, RequestDraft, RequestId, RequestStatus,
    ServiceKind, ServiceRequest, StatusLedgerEntry, StudentId, ValidationError,
};
use crate::inbound::http::schemas::{ErrorSchema, RequestStatusSchema, ServiceKindSchema};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

fn parse_kind(raw: &str) -> Result<ServiceKind, Error> {
    raw.parse::<ServiceKind>()
        .map_err(|err| ValidationError::from(err).into())
}

/// A request as returned by the API.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RequestResponse {
    pub id: i64,
    #[schema(value_type = ServiceKindSchema)]
    pub kind: ServiceKind,
    /// Surrogate id of the owning student.
    pub student_id: i64,
    pub student_name: String,
    #[schema(value_type = RequestStatusSchema)]
    pub status: RequestStatus,
    /// Variant fields, snake_case.
    #[schema(value_type = Object)]
    pub details: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ServiceRequest> for RequestResponse {
    type Error = Error;

    fn try_from(value: ServiceRequest) -> Result<Self, Self::Error> {
        let kind = value.kind();
        let details = value.payload.to_value().map_err(|err| {
            error!(error = %err, request_id = %value.id, %kind, "failed to encode request payload");
            Error::internal("failed to encode request payload")
        })?;
        Ok(Self {
            id: value.id.get(),
            kind,
            student_id: value.student_id.get(),
            student_name: value.student_name,
            status: value.status,
            details,
            created_at: value.created_at,
            updated_at: value.updated_at,
        })
    }
}

fn to_responses(requests: Vec<ServiceRequest>) -> Result<Vec<RequestResponse>, Error> {
    requests.into_iter().map(RequestResponse::try_from).collect()
}

/// One ledger entry.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusEntryResponse {
    pub id: i64,
    #[schema(value_type = RequestStatusSchema)]
    pub status: RequestStatus,
    pub updated_by: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<StatusLedgerEntry> for StatusEntryResponse {
    fn from(value: StatusLedgerEntry) -> Self {
        Self {
            id: value.id,
            status: value.status,
            updated_by: value.updated_by,
            notes: value.notes,
            created_at: value.created_at,
        }
    }
}

/// Filter for list requests.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListRequestsQuery {
    /// Only requests owned by this student.
    pub student_id: Option<i64>,
}

/// Body for `PUT /requests/{kind}/{id}/status`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdateRequest {
    #[schema(example = "processing")]
    pub status: String,
    #[serde(default, alias = "updated_by")]
    pub updated_by: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl From<StatusUpdateRequest> for StatusUpdate {
    fn from(value: StatusUpdateRequest) -> Self {
        Self {
            status: value.status,
            updated_by: value.updated_by,
            notes: value.notes,
        }
    }
}

/// Body for `PUT /requests/outing/{id}/notifications`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OutingNotificationsRequest {
    #[serde(default, alias = "parent_notified")]
    pub parent_notified: Option<bool>,
    #[serde(default, alias = "security_notified")]
    pub security_notified: Option<bool>,
}

impl From<OutingNotificationsRequest> for OutingNotificationFlags {
    fn from(value: OutingNotificationsRequest) -> Self {
        Self {
            parent_notified: value.parent_notified,
            security_notified: value.security_notified,
        }
    }
}

/// Submit a request owned by the signed-in student.
#[utoipa::path(
    post,
    path = "/api/v1/requests/{kind}",
    params(("kind" = ServiceKindSchema, Path, description = "Request variant")),
    request_body(content = Object, description = "Variant fields"),
    responses(
        (status = 201, description = "Request created", body = RequestResponse),
        (status = 400, description = "Unknown variant or invalid field", body = ErrorSchema),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 404, description = "Owning student no longer exists", body = ErrorSchema)
    ),
    tags = ["requests"],
    operation_id = "createRequest"
)]
#[post("/requests/{kind}")]
pub async fn create_request(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<Value>,
) -> ApiResult<HttpResponse> {
    let student_id = session.require_student_id()?;
    let kind = parse_kind(&path.into_inner())?;
    let draft = RequestDraft::from_value(payload.into_inner());
    let request = state
        .requests
        .create_request(kind, student_id, &draft)
        .await?;
    Ok(HttpResponse::Created().json(RequestResponse::try_from(request)?))
}

/// List requests of one variant, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/requests/{kind}",
    params(
        ("kind" = ServiceKindSchema, Path, description = "Request variant"),
        ListRequestsQuery
    ),
    responses(
        (status = 200, description = "Requests", body = [RequestResponse]),
        (status = 400, description = "Unknown variant", body = ErrorSchema),
        (status = 401, description = "Login required", body = ErrorSchema)
    ),
    tags = ["requests"],
    operation_id = "listRequests"
)]
#[get("/requests/{kind}")]
pub async fn list_requests(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    query: web::Query<ListRequestsQuery>,
) -> ApiResult<web::Json<Vec<RequestResponse>>> {
    session.require_student_id()?;
    let kind = parse_kind(&path.into_inner())?;
    let owner = query.into_inner().student_id.map(StudentId::new);
    let requests = state.requests_query.list_requests(kind, owner).await?;
    Ok(web::Json(to_responses(requests)?))
}

/// Fetch one request.
#[utoipa::path(
    get,
    path = "/api/v1/requests/{kind}/{id}",
    params(
        ("kind" = ServiceKindSchema, Path, description = "Request variant"),
        ("id" = i64, Path, description = "Request identifier")
    ),
    responses(
        (status = 200, description = "Request", body = RequestResponse),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 404, description = "No such request of this variant", body = ErrorSchema)
    ),
    tags = ["requests"],
    operation_id = "getRequest"
)]
#[get("/requests/{kind}/{id}")]
pub async fn get_request(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<(String, i64)>,
) -> ApiResult<web::Json<RequestResponse>> {
    session.require_student_id()?;
    let (kind, id) = path.into_inner();
    let kind = parse_kind(&kind)?;
    let request = state
        .requests_query
        .get_request(kind, RequestId::new(id))
        .await?;
    Ok(web::Json(request.try_into()?))
}

/// Move a request to its next stage and record the change.
#[utoipa::path(
    put,
    path = "/api/v1/requests/{kind}/{id}/status",
    params(
        ("kind" = ServiceKindSchema, Path, description = "Request variant"),
        ("id" = i64, Path, description = "Request identifier")
    ),
    request_body = StatusUpdateRequest,
    responses(
        (status = 200, description = "Updated request", body = RequestResponse),
        (status = 400, description = "Status not valid for this variant or stage", body = ErrorSchema),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 404, description = "No such request of this variant", body = ErrorSchema),
        (status = 409, description = "Request changed concurrently", body = ErrorSchema)
    ),
    tags = ["requests"],
    operation_id = "updateRequestStatus"
)]
#[put("/requests/{kind}/{id}/status")]
pub async fn update_status(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<(String, i64)>,
    payload: web::Json<StatusUpdateRequest>,
) -> ApiResult<web::Json<RequestResponse>> {
    session.require_student_id()?;
    let (kind, id) = path.into_inner();
    let kind = parse_kind(&kind)?;
    let update = StatusUpdate::from(payload.into_inner());
    let request = state
        .requests
        .update_status(kind, RequestId::new(id), &update)
        .await?;
    Ok(web::Json(request.try_into()?))
}

/// Status history of a request, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/requests/{kind}/{id}/history",
    params(
        ("kind" = ServiceKindSchema, Path, description = "Request variant"),
        ("id" = i64, Path, description = "Request identifier")
    ),
    responses(
        (status = 200, description = "Ledger entries", body = [StatusEntryResponse]),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 404, description = "No such request of this variant", body = ErrorSchema)
    ),
    tags = ["requests"],
    operation_id = "requestStatusHistory"
)]
#[get("/requests/{kind}/{id}/history")]
pub async fn status_history(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<(String, i64)>,
) -> ApiResult<web::Json<Vec<StatusEntryResponse>>> {
    session.require_student_id()?;
    let (kind, id) = path.into_inner();
    let kind = parse_kind(&kind)?;
    let entries = state
        .requests_query
        .status_history(kind, RequestId::new(id))
        .await?;
    Ok(web::Json(entries.into_iter().map(Into::into).collect()))
}

/// Record that parents or security were told about an outing.
#[utoipa::path(
    put,
    path = "/api/v1/requests/outing/{id}/notifications",
    params(("id" = i64, Path, description = "Outing request identifier")),
    request_body = OutingNotificationsRequest,
    responses(
        (status = 200, description = "Updated outing", body = RequestResponse),
        (status = 400, description = "No flag supplied", body = ErrorSchema),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 404, description = "No such outing", body = ErrorSchema)
    ),
    tags = ["requests"],
    operation_id = "setOutingNotifications"
)]
#[put("/requests/outing/{id}/notifications")]
pub async fn set_outing_notifications(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
    payload: web::Json<OutingNotificationsRequest>,
) -> ApiResult<web::Json<RequestResponse>> {
    session.require_student_id()?;
    let flags = OutingNotificationFlags::from(payload.into_inner());
    let request = state
        .requests
        .set_outing_notifications(RequestId::new(path.into_inner()), flags)
        .await?;
    Ok(web::Json(request.try_into()?))
}
