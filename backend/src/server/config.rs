//! HTTP server configuration object and helpers.

use std::net::SocketAddr;

use campus_portal::domain::ServiceContacts;
use campus_portal::inbound::http::session_config::SessionSettings;
use campus_portal::outbound::notification::TwilioCredentials;
use campus_portal::outbound::persistence::DbPool;

/// Everything needed to assemble and bind the server.
pub struct ServerConfig {
    pub(crate) session: SessionSettings,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) twilio: Option<TwilioCredentials>,
    pub(crate) contacts: ServiceContacts,
}

impl ServerConfig {
    /// Configuration backed by the in-memory store and the logging gateway.
    #[must_use]
    pub fn new(session: SessionSettings, bind_addr: SocketAddr) -> Self {
        Self {
            session,
            bind_addr,
            db_pool: None,
            twilio: None,
            contacts: ServiceContacts::default(),
        }
    }

    /// Persist through PostgreSQL.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Send WhatsApp messages through Twilio when credentials are present.
    #[must_use]
    pub fn with_twilio(mut self, credentials: Option<TwilioCredentials>) -> Self {
        self.twilio = credentials;
        self
    }

    /// Desk numbers notified on submission.
    #[must_use]
    pub fn with_contacts(mut self, contacts: ServiceContacts) -> Self {
        self.contacts = contacts;
        self
    }
}
