//! Reqwest-backed WhatsApp gateway using the Twilio Messages API.
//!
//! This adapter owns transport details only: number normalisation, form
//! encoding, basic auth, timeout and response decoding.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use tracing::debug;
use zeroize::Zeroizing;

use crate::domain::ports::{NotificationGateway, NotificationGatewayError};
use crate::domain::{NotificationMessage, NotificationReceipt};

const DEFAULT_API_BASE: &str = "https://api.twilio.com/2010-04-01/";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const WHATSAPP_PREFIX: &str = "whatsapp:";

/// Account credentials and sender identity for the Twilio API.
#[derive(Clone)]
pub struct TwilioCredentials {
    /// Account SID, also used as the basic auth user.
    pub account_sid: String,
    /// Auth token, used as the basic auth password.
    pub auth_token: Zeroizing<String>,
    /// Sender number, with or without the `whatsapp:` prefix.
    pub sender: String,
    /// Prefix for destination numbers given without a country code.
    pub default_country_code: String,
}

/// WhatsApp gateway posting to one Twilio account.
pub struct TwilioWhatsAppGateway {
    client: Client,
    messages_url: Url,
    account_sid: String,
    auth_token: Zeroizing<String>,
    sender: String,
    default_country_code: String,
}

#[derive(Debug, Deserialize)]
struct MessageResourceDto {
    sid: Option<String>,
}

impl TwilioWhatsAppGateway {
    /// Build a gateway against the public Twilio API.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed or the
    /// account SID does not form a valid URL path segment.
    pub fn new(credentials: TwilioCredentials) -> Result<Self, NotificationGatewayError> {
        let base = Url::parse(DEFAULT_API_BASE)
            .map_err(|err| NotificationGatewayError::transport(err.to_string()))?;
        Self::with_api_base(credentials, base)
    }

    /// Build a gateway against an alternative API base, such as a stub server.
    ///
    /// # Errors
    ///
    /// See [`TwilioWhatsAppGateway::new`].
    pub fn with_api_base(
        credentials: TwilioCredentials,
        api_base: Url,
    ) -> Result<Self, NotificationGatewayError> {
        let messages_url = messages_url(&api_base, &credentials.account_sid)?;
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| NotificationGatewayError::transport(err.to_string()))?;
        Ok(Self {
            client,
            messages_url,
            account_sid: credentials.account_sid,
            auth_token: credentials.auth_token,
            sender: whatsapp_address(&credentials.sender),
            default_country_code: credentials.default_country_code,
        })
    }
}

#[async_trait]
impl NotificationGateway for TwilioWhatsAppGateway {
    async fn send(
        &self,
        message: &NotificationMessage,
    ) -> Result<NotificationReceipt, NotificationGatewayError> {
        let to = whatsapp_address(&international_number(
            message.phone(),
            &self.default_country_code,
        ));
        debug!(service = message.service_tag(), %to, "posting WhatsApp message");

        let response = self
            .client
            .post(self.messages_url.clone())
            .basic_auth(&self.account_sid, Some(self.auth_token.as_str()))
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&[
                ("From", self.sender.as_str()),
                ("To", to.as_str()),
                ("Body", message.body()),
            ])
            .send()
            .await
            .map_err(|err| NotificationGatewayError::transport(err.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|err| NotificationGatewayError::transport(err.to_string()))?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        parse_receipt(body.as_ref())
    }
}

fn messages_url(api_base: &Url, account_sid: &str) -> Result<Url, NotificationGatewayError> {
    let sid = account_sid.trim();
    if sid.is_empty() || !sid.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(NotificationGatewayError::transport(
            "account SID must be a non-empty alphanumeric string",
        ));
    }
    api_base
        .join(&format!("Accounts/{sid}/Messages.json"))
        .map_err(|err| NotificationGatewayError::transport(err.to_string()))
}

/// Prefix `phone` with `country_code` unless it already carries one.
fn international_number(phone: &str, country_code: &str) -> String {
    let compact: String = phone.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.starts_with('+') {
        compact
    } else {
        format!("{country_code}{compact}")
    }
}

fn whatsapp_address(number: &str) -> String {
    let trimmed = number.trim();
    if trimmed.starts_with(WHATSAPP_PREFIX) {
        trimmed.to_owned()
    } else {
        format!("{WHATSAPP_PREFIX}{trimmed}")
    }
}

fn parse_receipt(body: &[u8]) -> Result<NotificationReceipt, NotificationGatewayError> {
    let decoded: MessageResourceDto = serde_json::from_slice(body).map_err(|err| {
        NotificationGatewayError::decode(format!("invalid Twilio JSON payload: {err}"))
    })?;
    Ok(NotificationReceipt::sent(decoded.sid))
}

fn map_status_error(status: StatusCode, body: &[u8]) -> NotificationGatewayError {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview: String = compact.chars().take(PREVIEW_CHAR_LIMIT).collect();
    NotificationGatewayError::rejected(status.as_u16(), preview)
}
