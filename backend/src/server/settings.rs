//! Environment-driven settings loaded via OrthoConfig.
//!
//! Each group reads its own prefix: `PORTAL_*` for the server and store,
//! `TWILIO_*` for the WhatsApp provider and `CONTACTS_*` for the desk numbers
//! that receive submission notices.

use std::ffi::OsString;
use std::net::SocketAddr;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use campus_portal::domain::{ServiceContacts, ServiceKind};
use campus_portal::outbound::notification::TwilioCredentials;
use zeroize::Zeroizing;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_WHATSAPP_SENDER: &str = "whatsapp:+14155238886";
const DEFAULT_COUNTRY_CODE: &str = "+91";

/// Load settings from the environment and configuration files only.
pub(crate) fn load_settings<T: OrthoConfig>() -> std::io::Result<T> {
    T::load_from_iter([OsString::from("campus-portal")])
        .map_err(|err| std::io::Error::other(format!("invalid configuration: {err}")))
}

/// Server and store settings.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "PORTAL")]
pub struct PortalSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL connection string; the in-memory store is used when unset.
    pub database_url: Option<String>,
    /// Pool size.
    pub database_max_connections: Option<u32>,
    /// Leave the schema alone on startup.
    #[ortho_config(default = false)]
    pub skip_migrations: bool,
}

impl PortalSettings {
    /// Parsed listen address.
    pub fn bind_addr(&self) -> std::io::Result<SocketAddr> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|err| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("invalid PORTAL_BIND_ADDR {raw:?}: {err}"),
            )
        })
    }

    /// Configured database URL, ignoring blank values.
    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    pub fn database_max_connections(&self) -> u32 {
        self.database_max_connections
            .unwrap_or(DEFAULT_MAX_CONNECTIONS)
    }
}

/// WhatsApp provider settings.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "TWILIO")]
pub struct TwilioSettings {
    pub account_sid: Option<String>,
    pub auth_token: Option<String>,
    /// Sender number; defaults to the Twilio sandbox.
    pub whatsapp_number: Option<String>,
    /// Prefix for destination numbers given without one.
    pub default_country_code: Option<String>,
}

impl TwilioSettings {
    /// Credentials when both the account SID and token are set.
    pub fn credentials(&self) -> Option<TwilioCredentials> {
        let account_sid = non_blank(self.account_sid.as_deref())?;
        let auth_token = non_blank(self.auth_token.as_deref())?;
        Some(TwilioCredentials {
            account_sid: account_sid.to_owned(),
            auth_token: Zeroizing::new(auth_token.to_owned()),
            sender: non_blank(self.whatsapp_number.as_deref())
                .unwrap_or(DEFAULT_WHATSAPP_SENDER)
                .to_owned(),
            default_country_code: non_blank(self.default_country_code.as_deref())
                .unwrap_or(DEFAULT_COUNTRY_CODE)
                .to_owned(),
        })
    }
}

/// Desk numbers notified when a request of their variant is submitted.
#[derive(Debug, Clone, Default, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "CONTACTS")]
pub struct ContactSettings {
    pub security_office: Option<String>,
    pub xerox_shop: Option<String>,
    pub mess_manager: Option<String>,
    pub fivestar_restaurant: Option<String>,
    pub ccd: Option<String>,
    pub stationary_shop: Option<String>,
}

impl ContactSettings {
    /// Contacts keyed by variant; unset numbers are skipped.
    pub fn service_contacts(&self) -> ServiceContacts {
        ServiceKind::ALL
            .into_iter()
            .fold(ServiceContacts::default(), |contacts, kind| {
                match non_blank(self.number_for(kind)) {
                    Some(number) => contacts.with_contact(kind, number),
                    None => contacts,
                }
            })
    }

    fn number_for(&self, kind: ServiceKind) -> Option<&str> {
        match kind {
            ServiceKind::Outing => self.security_office.as_deref(),
            ServiceKind::Xerox => self.xerox_shop.as_deref(),
            ServiceKind::Mess => self.mess_manager.as_deref(),
            ServiceKind::Fivestar => self.fivestar_restaurant.as_deref(),
            ServiceKind::Ccd => self.ccd.as_deref(),
            ServiceKind::Stationary => self.stationary_shop.as_deref(),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|text| !text.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use env_lock::lock_env;
    use rstest::rstest;

    const PORTAL_VARS: [&str; 4] = [
        "PORTAL_BIND_ADDR",
        "PORTAL_DATABASE_URL",
        "PORTAL_DATABASE_MAX_CONNECTIONS",
        "PORTAL_SKIP_MIGRATIONS",
    ];

    #[rstest]
    fn portal_defaults_apply_when_unset() {
        let _guard = lock_env(PORTAL_VARS.map(|name| (name, None::<String>)));

        let settings: PortalSettings = load_settings().expect("settings load");
        assert_eq!(
            settings.bind_addr().expect("default address"),
            DEFAULT_BIND_ADDR.parse::<SocketAddr>().expect("valid address")
        );
        assert!(settings.database_url().is_none());
        assert_eq!(settings.database_max_connections(), DEFAULT_MAX_CONNECTIONS);
        assert!(!settings.skip_migrations);
    }

    #[rstest]
    fn portal_environment_overrides() {
        let _guard = lock_env([
            ("PORTAL_BIND_ADDR", Some("127.0.0.1:9000".to_owned())),
            (
                "PORTAL_DATABASE_URL",
                Some("postgres://portal@localhost/portal".to_owned()),
            ),
            ("PORTAL_DATABASE_MAX_CONNECTIONS", Some("4".to_owned())),
            ("PORTAL_SKIP_MIGRATIONS", Some("true".to_owned())),
        ]);

        let settings: PortalSettings = load_settings().expect("settings load");
        assert_eq!(
            settings.bind_addr().expect("address").port(),
            9000
        );
        assert_eq!(
            settings.database_url(),
            Some("postgres://portal@localhost/portal")
        );
        assert_eq!(settings.database_max_connections(), 4);
        assert!(settings.skip_migrations);
    }

    #[rstest]
    fn malformed_bind_address_is_rejected() {
        let settings = PortalSettings {
            bind_addr: Some("not-an-address".to_owned()),
            database_url: None,
            database_max_connections: None,
            skip_migrations: false,
        };
        let err = settings.bind_addr().expect_err("must fail");
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidInput);
    }

    #[rstest]
    #[case(None, Some("token"))]
    #[case(Some("AC123"), None)]
    #[case(Some("  "), Some("token"))]
    fn twilio_needs_sid_and_token(#[case] sid: Option<&str>, #[case] token: Option<&str>) {
        let settings = TwilioSettings {
            account_sid: sid.map(str::to_owned),
            auth_token: token.map(str::to_owned),
            whatsapp_number: None,
            default_country_code: None,
        };
        assert!(settings.credentials().is_none());
    }

    #[rstest]
    fn twilio_defaults_fill_sender_and_country_code() {
        let settings = TwilioSettings {
            account_sid: Some("AC123".to_owned()),
            auth_token: Some("secret".to_owned()),
            whatsapp_number: None,
            default_country_code: None,
        };
        let credentials = settings.credentials().expect("credentials");
        assert_eq!(credentials.sender, DEFAULT_WHATSAPP_SENDER);
        assert_eq!(credentials.default_country_code, DEFAULT_COUNTRY_CODE);
        assert_eq!(credentials.auth_token.as_str(), "secret");
    }

    #[rstest]
    fn contacts_skip_blank_numbers() {
        let settings = ContactSettings {
            xerox_shop: Some("9000000001".to_owned()),
            ccd: Some("   ".to_owned()),
            security_office: Some("9000000009".to_owned()),
            ..ContactSettings::default()
        };
        let contacts = settings.service_contacts();
        assert_eq!(contacts.contact_for(ServiceKind::Xerox), Some("9000000001"));
        assert_eq!(contacts.contact_for(ServiceKind::Outing), Some("9000000009"));
        assert_eq!(contacts.contact_for(ServiceKind::Ccd), None);
        assert_eq!(contacts.contact_for(ServiceKind::Mess), None);
    }
}
