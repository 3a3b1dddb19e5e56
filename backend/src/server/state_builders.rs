//! Builders for the HTTP state from the configured adapters.
//!
//! With a pool every repository port is Diesel-backed; without one a single
//! in-memory store serves all three. The notification gateway is Twilio when
//! credentials are configured and the logging gateway otherwise.

use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};
use tracing::{info, warn};

use campus_portal::domain::ports::{
    NotificationGateway, ServiceRequestRepository, StatusLedgerRepository, StudentRepository,
};
use campus_portal::domain::{
    DashboardService, IdentityService, NotificationDispatcher, NotificationService,
    ServiceContacts, ServiceRequestService,
};
use campus_portal::inbound::http::state::{HttpState, HttpStatePorts};
use campus_portal::outbound::memory::InMemoryPortalStore;
use campus_portal::outbound::notification::{LoggingNotificationGateway, TwilioWhatsAppGateway};
use campus_portal::outbound::persistence::{
    DieselServiceRequestRepository, DieselStatusLedgerRepository, DieselStudentRepository,
};
use campus_portal::outbound::security::Argon2PasswordHasher;

use super::ServerConfig;

/// Collaborators shared by every service regardless of store.
struct SharedDeps {
    hasher: Arc<Argon2PasswordHasher>,
    gateway: Arc<dyn NotificationGateway>,
    contacts: ServiceContacts,
    clock: Arc<dyn Clock>,
}

fn build_gateway(config: &ServerConfig) -> std::io::Result<Arc<dyn NotificationGateway>> {
    match &config.twilio {
        Some(credentials) => {
            let gateway = TwilioWhatsAppGateway::new(credentials.clone())
                .map_err(|err| std::io::Error::other(format!("twilio gateway: {err}")))?;
            info!(sender = %credentials.sender, "sending notifications through Twilio WhatsApp");
            Ok(Arc::new(gateway))
        }
        None => {
            warn!("TWILIO_ACCOUNT_SID or TWILIO_AUTH_TOKEN unset; notifications will only be logged");
            Ok(Arc::new(LoggingNotificationGateway))
        }
    }
}

fn wire_services<S, R, L>(
    students: Arc<S>,
    requests: Arc<R>,
    ledger: Arc<L>,
    deps: SharedDeps,
) -> HttpStatePorts
where
    S: StudentRepository + 'static,
    R: ServiceRequestRepository + 'static,
    L: StatusLedgerRepository + 'static,
{
    let identity = Arc::new(IdentityService::new(
        students.clone(),
        deps.hasher,
        deps.clock.clone(),
    ));
    let dispatcher = NotificationDispatcher::new(deps.gateway.clone(), deps.contacts);
    let service_requests = Arc::new(ServiceRequestService::new(
        students.clone(),
        requests.clone(),
        ledger,
        dispatcher,
        deps.clock.clone(),
    ));
    let dashboard = Arc::new(DashboardService::new(students, requests, deps.clock));

    HttpStatePorts {
        login: identity.clone(),
        students: identity.clone(),
        students_query: identity,
        requests: service_requests.clone(),
        requests_query: service_requests,
        dashboard,
        notifications: Arc::new(NotificationService::new(deps.gateway)),
    }
}

/// Build the shared HTTP state for `config`.
pub(super) fn build_http_state(config: &ServerConfig) -> std::io::Result<web::Data<HttpState>> {
    let hasher = Argon2PasswordHasher::new()
        .map_err(|err| std::io::Error::other(format!("password hasher: {err}")))?;
    let deps = SharedDeps {
        hasher: Arc::new(hasher),
        gateway: build_gateway(config)?,
        contacts: config.contacts.clone(),
        clock: Arc::new(DefaultClock),
    };

    let ports = match &config.db_pool {
        Some(pool) => wire_services(
            Arc::new(DieselStudentRepository::new(pool.clone())),
            Arc::new(DieselServiceRequestRepository::new(pool.clone())),
            Arc::new(DieselStatusLedgerRepository::new(pool.clone())),
            deps,
        ),
        None => {
            warn!("no database configured; records live in memory and vanish on restart");
            let store = Arc::new(InMemoryPortalStore::new());
            wire_services(store.clone(), store.clone(), store, deps)
        }
    };
    Ok(web::Data::new(HttpState::new(ports)))
}
