//! Gateway used when no messaging provider is configured.

use async_trait::async_trait;
use tracing::info;

use crate::domain::ports::{NotificationGateway, NotificationGatewayError};
use crate::domain::{NotificationMessage, NotificationReceipt};

/// Logs every message instead of delivering it.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingNotificationGateway;

#[async_trait]
impl NotificationGateway for LoggingNotificationGateway {
    async fn send(
        &self,
        message: &NotificationMessage,
    ) -> Result<NotificationReceipt, NotificationGatewayError> {
        info!(
            phone = message.phone(),
            service = message.service_tag(),
            body = message.body(),
            "notification provider not configured; message logged only"
        );
        Ok(NotificationReceipt::logged_locally())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NotificationDisposition;

    #[tokio::test]
    async fn messages_are_reported_as_logged_locally() {
        let message =
            NotificationMessage::try_new("9999999999", "Order ready", "xerox").expect("valid");
        let receipt = LoggingNotificationGateway
            .send(&message)
            .await
            .expect("logging never fails");
        assert!(!receipt.delivered);
        assert_eq!(receipt.disposition, NotificationDisposition::LoggedLocally);
    }
}
