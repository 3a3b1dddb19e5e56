//! Notification messages, receipts and background dispatch.
//!
//! Notifications never decide the outcome of the operation that triggers
//! them. [`NotificationDispatcher`] hands each message to a spawned task and
//! only logs what happens to it; [`NotificationService`] is the direct path
//! used when a caller explicitly asks to send and wants the receipt.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::ports::{NotificationCommand, NotificationGateway, NotificationGatewayError};
use super::validation::required_text;
use super::{Error, ServiceKind, ServiceRequest, TraceId, ValidationError};

/// Validated outbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationMessage {
    phone: String,
    body: String,
    service_tag: String,
}

impl NotificationMessage {
    /// Build a message; all parts are trimmed and must be non-empty.
    ///
    /// # Examples
    /// ```
    /// use campus_portal::domain::NotificationMessage;
    ///
    /// let message = NotificationMessage::try_new("9999999999", "Order ready", "xerox").unwrap();
    /// assert_eq!(message.service_tag(), "xerox");
    /// assert!(NotificationMessage::try_new(" ", "hi", "xerox").is_err());
    /// ```
    pub fn try_new(
        phone: &str,
        body: &str,
        service_tag: &str,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            phone: required_text("phone", Some(phone))?,
            body: required_text("message", Some(body))?,
            service_tag: required_text("service", Some(service_tag))?,
        })
    }

    /// Destination phone number as supplied.
    #[must_use]
    pub fn phone(&self) -> &str {
        &self.phone
    }

    /// Message text.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Service the message concerns, for logs and provider metadata.
    #[must_use]
    pub fn service_tag(&self) -> &str {
        &self.service_tag
    }
}

/// How a gateway handled a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationDisposition {
    /// Accepted by the provider.
    Sent,
    /// No provider configured; the message was only logged.
    LoggedLocally,
}

/// Outcome of a send attempt that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationReceipt {
    /// Whether the provider accepted the message.
    pub delivered: bool,
    /// Provider reference for the message, when sent.
    pub provider_message_id: Option<String>,
    /// How the message was handled.
    pub disposition: NotificationDisposition,
}

impl NotificationReceipt {
    /// Receipt for a message accepted by the provider.
    #[must_use]
    pub fn sent(provider_message_id: Option<String>) -> Self {
        Self {
            delivered: true,
            provider_message_id,
            disposition: NotificationDisposition::Sent,
        }
    }

    /// Receipt for a message that was only logged.
    #[must_use]
    pub fn logged_locally() -> Self {
        Self {
            delivered: false,
            provider_message_id: None,
            disposition: NotificationDisposition::LoggedLocally,
        }
    }
}

/// Phone numbers of the desks that handle each variant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceContacts {
    numbers: BTreeMap<ServiceKind, String>,
}

impl ServiceContacts {
    /// Register the desk number for `kind`; blank numbers are ignored.
    #[must_use]
    pub fn with_contact(mut self, kind: ServiceKind, number: impl Into<String>) -> Self {
        let number = number.into();
        let trimmed = number.trim();
        if !trimmed.is_empty() {
            self.numbers.insert(kind, trimmed.to_owned());
        }
        self
    }

    /// Desk number for `kind`, if configured.
    #[must_use]
    pub fn contact_for(&self, kind: ServiceKind) -> Option<&str> {
        self.numbers.get(&kind).map(String::as_str)
    }
}

/// Fire-and-forget delivery of request notifications.
#[derive(Clone)]
pub struct NotificationDispatcher {
    gateway: Arc<dyn NotificationGateway>,
    contacts: ServiceContacts,
}

impl NotificationDispatcher {
    /// Create a dispatcher over `gateway` for the given desks.
    pub fn new(gateway: Arc<dyn NotificationGateway>, contacts: ServiceContacts) -> Self {
        Self { gateway, contacts }
    }

    /// Tell the variant's desk about a new request. Skipped when no desk
    /// number is configured.
    pub fn request_submitted(&self, request: &ServiceRequest) -> Option<JoinHandle<()>> {
        let kind = request.kind();
        let Some(desk) = self.contacts.contact_for(kind) else {
            debug!(kind = %kind, "no desk contact configured; skipping notification");
            return None;
        };
        let body = format!(
            "New {} request #{} from {}: {}",
            kind.display_name(),
            request.id,
            request.student_name,
            request.payload.summary()
        );
        match NotificationMessage::try_new(desk, &body, kind.as_str()) {
            Ok(message) => self.dispatch(message),
            Err(error) => {
                warn!(kind = %kind, %error, "notification message rejected");
                None
            }
        }
    }

    /// Send `message` on a background task. Returns `None` when called
    /// outside a Tokio runtime, in which case the message is dropped.
    pub fn dispatch(&self, message: NotificationMessage) -> Option<JoinHandle<()>> {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!(
                service = message.service_tag(),
                "no async runtime available; notification dropped"
            );
            return None;
        };
        let gateway = Arc::clone(&self.gateway);
        Some(runtime.spawn(TraceId::propagate(async move {
            match gateway.send(&message).await {
                Ok(receipt) => info!(
                    service = message.service_tag(),
                    delivered = receipt.delivered,
                    disposition = ?receipt.disposition,
                    provider_message_id = receipt.provider_message_id.as_deref(),
                    "notification handled"
                ),
                Err(error) => warn!(
                    service = message.service_tag(),
                    %error,
                    "notification delivery failed"
                ),
            }
        })))
    }
}

/// Direct notification use-case backed by a gateway.
#[derive(Clone)]
pub struct NotificationService {
    gateway: Arc<dyn NotificationGateway>,
}

impl NotificationService {
    /// Create the service over `gateway`.
    pub fn new(gateway: Arc<dyn NotificationGateway>) -> Self {
        Self { gateway }
    }
}

fn map_gateway_error(error: &NotificationGatewayError) -> Error {
    match error {
        NotificationGatewayError::Transport { .. } | NotificationGatewayError::Rejected { .. } => {
            Error::service_unavailable("notification provider unavailable")
        }
        NotificationGatewayError::Decode { .. } => {
            Error::internal("notification provider returned an unreadable response")
        }
    }
}

#[async_trait]
impl NotificationCommand for NotificationService {
    async fn send_notification(
        &self,
        message: &NotificationMessage,
    ) -> Result<NotificationReceipt, Error> {
        self.gateway.send(message).await.map_err(|error| {
            warn!(service = message.service_tag(), %error, "direct notification failed");
            map_gateway_error(&error)
        })
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for dispatch and direct sends.
    use super::*;
    use crate::domain::ports::MockNotificationGateway;
    use crate::domain::{ErrorCode, RequestId, RequestPayload, RequestStatus, StudentId, XeroxOrder};
    use chrono::{TimeZone, Utc};
    use tokio::sync::mpsc;

    fn xerox_request() -> ServiceRequest {
        let at = Utc.with_ymd_and_hms(2026, 10, 19, 9, 0, 0).single().expect("valid time");
        ServiceRequest {
            id: RequestId::new(7),
            student_id: StudentId::new(1),
            student_name: "Asha Rao".to_owned(),
            status: RequestStatus::Pending,
            payload: RequestPayload::Xerox(XeroxOrder {
                service_type: "b&w".to_owned(),
                pages: 10,
                delivery_location: "hostel-A".to_owned(),
                instructions: None,
                contact_number: "9999999999".to_owned(),
            }),
            created_at: at,
            updated_at: at,
        }
    }

    #[tokio::test]
    async fn request_submitted_notifies_the_desk() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut gateway = MockNotificationGateway::new();
        gateway.expect_send().times(1).returning(move |message| {
            tx.send(message.clone()).expect("receiver alive");
            Ok(NotificationReceipt::logged_locally())
        });
        let dispatcher = NotificationDispatcher::new(
            Arc::new(gateway),
            ServiceContacts::default().with_contact(ServiceKind::Xerox, "+911234567890"),
        );

        let handle = dispatcher
            .request_submitted(&xerox_request())
            .expect("dispatched");
        handle.await.expect("task completes");

        let message = rx.recv().await.expect("message sent");
        assert_eq!(message.phone(), "+911234567890");
        assert_eq!(message.service_tag(), "xerox");
        assert!(message.body().contains("Xerox request #7 from Asha Rao"));
    }

    #[tokio::test]
    async fn request_submitted_without_contact_is_skipped() {
        let mut gateway = MockNotificationGateway::new();
        gateway.expect_send().never();
        let dispatcher = NotificationDispatcher::new(Arc::new(gateway), ServiceContacts::default());
        assert!(dispatcher.request_submitted(&xerox_request()).is_none());
    }

    #[tokio::test]
    async fn gateway_failures_stay_inside_the_task() {
        let mut gateway = MockNotificationGateway::new();
        gateway
            .expect_send()
            .times(1)
            .returning(|_| Err(NotificationGatewayError::transport("connection reset")));
        let dispatcher = NotificationDispatcher::new(Arc::new(gateway), ServiceContacts::default());
        let message = NotificationMessage::try_new("1", "hello", "outing").expect("valid");
        let handle = dispatcher.dispatch(message).expect("dispatched");
        assert!(handle.await.is_ok());
    }

    #[test]
    fn dispatch_outside_runtime_drops_message() {
        let mut gateway = MockNotificationGateway::new();
        gateway.expect_send().never();
        let dispatcher = NotificationDispatcher::new(Arc::new(gateway), ServiceContacts::default());
        let message = NotificationMessage::try_new("1", "hello", "outing").expect("valid");
        assert!(dispatcher.dispatch(message).is_none());
    }

    #[tokio::test]
    async fn direct_send_maps_transport_failure_to_service_unavailable() {
        let mut gateway = MockNotificationGateway::new();
        gateway
            .expect_send()
            .returning(|_| Err(NotificationGatewayError::rejected(401_u16, "bad auth")));
        let service = NotificationService::new(Arc::new(gateway));
        let message = NotificationMessage::try_new("1", "hello", "xerox").expect("valid");
        let err = service
            .send_notification(&message)
            .await
            .expect_err("gateway failure surfaces");
        assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
    }

    #[test]
    fn blank_contacts_are_ignored() {
        let contacts = ServiceContacts::default().with_contact(ServiceKind::Mess, "  ");
        assert_eq!(contacts.contact_for(ServiceKind::Mess), None);
    }
}
