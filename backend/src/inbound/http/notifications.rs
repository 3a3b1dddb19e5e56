//! Direct notification API handler.
//!
//! ```text
//! POST /api/v1/notifications {"phone":"9999999999","message":"Order ready","service":"xerox"}
//! ```
//!
//! Unlike the notices sent in the background after a submission, a failed
//! send here is reported to the caller.

use actix_web::{post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    ApiResult, NotificationDisposition, NotificationMessage, NotificationReceipt,
};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Body for `POST /api/v1/notifications`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRequest {
    #[serde(default)]
    #[schema(example = "9999999999")]
    pub phone: String,
    #[serde(default)]
    #[schema(example = "Your print order is ready")]
    pub message: String,
    /// Service the message concerns, used in logs.
    #[serde(default)]
    #[schema(example = "xerox")]
    pub service: String,
}

/// How the message was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DispositionResponse {
    /// Accepted by the messaging provider.
    Sent,
    /// No provider configured; the message was written to the log.
    LoggedLocally,
}

impl From<NotificationDisposition> for DispositionResponse {
    fn from(value: NotificationDisposition) -> Self {
        match value {
            NotificationDisposition::Sent => Self::Sent,
            NotificationDisposition::LoggedLocally => Self::LoggedLocally,
        }
    }
}

/// Result of a send.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationResponse {
    pub delivered: bool,
    /// Provider reference, when the provider accepted the message.
    pub provider_message_id: Option<String>,
    pub disposition: DispositionResponse,
}

impl From<NotificationReceipt> for NotificationResponse {
    fn from(value: NotificationReceipt) -> Self {
        Self {
            delivered: value.delivered,
            provider_message_id: value.provider_message_id,
            disposition: value.disposition.into(),
        }
    }
}

/// Send a WhatsApp message through the configured provider.
#[utoipa::path(
    post,
    path = "/api/v1/notifications",
    request_body = NotificationRequest,
    responses(
        (status = 200, description = "Message handled", body = NotificationResponse),
        (status = 400, description = "Blank phone, message or service", body = ErrorSchema),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 503, description = "Provider unavailable or rejected the message", body = ErrorSchema)
    ),
    tags = ["notifications"],
    operation_id = "sendNotification"
)]
#[post("/notifications")]
pub async fn send_notification(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<NotificationRequest>,
) -> ApiResult<web::Json<NotificationResponse>> {
    session.require_student_id()?;
    let body = payload.into_inner();
    let message = NotificationMessage::try_new(&body.phone, &body.message, &body.service)?;
    let receipt = state.notifications.send_notification(&message).await?;
    Ok(web::Json(receipt.into()))
}
