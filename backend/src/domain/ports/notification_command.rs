//! Driving port for sending a notification on demand.

use async_trait::async_trait;

use crate::domain::{Error, NotificationMessage, NotificationReceipt};

/// Domain use-case port for direct sends, where the caller wants the receipt.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationCommand: Send + Sync {
    /// Deliver `message` and report the outcome.
    async fn send_notification(
        &self,
        message: &NotificationMessage,
    ) -> Result<NotificationReceipt, Error>;
}
