//! Notification gateway adapters.
//!
//! - **twilio_gateway**: WhatsApp delivery through the Twilio REST API.
//! - **logging_gateway**: local fallback when no credentials are configured.

mod logging_gateway;
mod twilio_gateway;

pub use logging_gateway::LoggingNotificationGateway;
pub use twilio_gateway::{TwilioCredentials, TwilioWhatsAppGateway};
