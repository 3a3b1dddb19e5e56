//! Port for outbound notification delivery.

use async_trait::async_trait;

use crate::domain::{NotificationMessage, NotificationReceipt};

use super::define_port_error;

define_port_error! {
    /// Errors raised by notification gateways.
    pub enum NotificationGatewayError {
        /// The provider could not be reached.
        Transport { message: String } =>
            "notification transport failed: {message}",
        /// The provider refused the message.
        Rejected { status: u16, message: String } =>
            "notification provider rejected message ({status}): {message}",
        /// The provider response could not be decoded.
        Decode { message: String } =>
            "notification provider response unreadable: {message}",
    }
}

/// Port for delivering a message to a phone number.
///
/// Gateways without provider configuration must still succeed with a
/// receipt marked as logged locally.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationGateway: Send + Sync {
    /// Attempt delivery of `message`.
    async fn send(
        &self,
        message: &NotificationMessage,
    ) -> Result<NotificationReceipt, NotificationGatewayError>;
}
