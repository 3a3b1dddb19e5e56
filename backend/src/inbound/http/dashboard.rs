//! Dashboard API handler.
//!
//! ```text
//! GET /api/v1/dashboard
//! ```

use actix_web::{get, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{ApiResult, DashboardSnapshot, ServiceKind, ServiceTally};
use crate::inbound::http::schemas::{ErrorSchema, ServiceKindSchema};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Counts for one request variant.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceTallyResponse {
    #[schema(value_type = ServiceKindSchema)]
    pub kind: ServiceKind,
    /// Display label, e.g. `Xerox`.
    pub label: String,
    /// Requests still `pending`.
    pub pending: u64,
    /// Requests submitted on `day`.
    pub created_today: u64,
}

impl From<ServiceTally> for ServiceTallyResponse {
    fn from(value: ServiceTally) -> Self {
        Self {
            kind: value.kind,
            label: value.kind.display_name().to_owned(),
            pending: value.pending,
            created_today: value.created_today,
        }
    }
}

/// Combined counts shown on the portal dashboard.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub total_students: u64,
    /// Server-local day the `createdToday` counts refer to.
    #[schema(value_type = String, format = Date, example = "2026-10-19")]
    pub day: NaiveDate,
    pub services: Vec<ServiceTallyResponse>,
}

impl From<DashboardSnapshot> for DashboardResponse {
    fn from(value: DashboardSnapshot) -> Self {
        Self {
            total_students: value.total_students,
            day: value.day,
            services: value.services.into_iter().map(Into::into).collect(),
        }
    }
}

/// Dashboard snapshot, recomputed on every call.
#[utoipa::path(
    get,
    path = "/api/v1/dashboard",
    responses(
        (status = 200, description = "Dashboard counts", body = DashboardResponse),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 503, description = "Store unavailable", body = ErrorSchema)
    ),
    tags = ["dashboard"],
    operation_id = "dashboard"
)]
#[get("/dashboard")]
pub async fn dashboard(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<DashboardResponse>> {
    session.require_student_id()?;
    let snapshot = state.dashboard.snapshot().await?;
    Ok(web::Json(snapshot.into()))
}
