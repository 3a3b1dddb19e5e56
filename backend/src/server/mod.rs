//! Server construction and middleware wiring.

mod config;
mod settings;
mod state_builders;

pub use config::ServerConfig;
pub(crate) use settings::{ContactSettings, PortalSettings, TwilioSettings, load_settings};

use state_builders::build_http_state;

use actix_session::{
    SessionMiddleware,
    config::{CookieContentSecurity, PersistentSession},
    storage::CookieSessionStore,
};
use std::future::Future;

use actix_web::dev::{Server, ServerHandle, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

use campus_portal::Trace;
#[cfg(debug_assertions)]
use campus_portal::doc::ApiDoc;
use campus_portal::inbound::http::dashboard::dashboard;
use campus_portal::inbound::http::error::{json_error_handler, query_error_handler};
use campus_portal::inbound::http::health::{HealthState, live, ready};
use campus_portal::inbound::http::notifications::send_notification;
use campus_portal::inbound::http::requests::{
    create_request, get_request, list_requests, set_outing_notifications, status_history,
    update_status,
};
use campus_portal::inbound::http::session_config::SessionSettings;
use campus_portal::inbound::http::state::HttpState;
use campus_portal::inbound::http::students::{
    current_student, get_student, list_students, login, logout, register, update_profile,
};
use tracing::info;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    session: SessionSettings,
}

fn session_middleware(settings: SessionSettings) -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), settings.key)
        .cookie_name("session".into())
        .cookie_path("/".into())
        .cookie_secure(settings.cookie_secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(settings.same_site)
        .session_lifecycle(PersistentSession::default().session_ttl(settings.ttl))
        .build()
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        session,
    } = deps;

    // `/students/me` must be registered ahead of `/students/{id}`.
    let api = web::scope("/api/v1")
        .wrap(session_middleware(session))
        .service(register)
        .service(login)
        .service(logout)
        .service(current_student)
        .service(update_profile)
        .service(list_students)
        .service(get_student)
        .service(set_outing_notifications)
        .service(create_request)
        .service(list_requests)
        .service(get_request)
        .service(update_status)
        .service(status_history)
        .service(dashboard)
        .service(send_notification);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(query_error_handler))
        .wrap(Trace)
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Construct the HTTP server and mark it ready once bound.
///
/// Process signals are not handled here; pair the server with
/// [`drain_on`] so the probes report draining before workers stop.
///
/// # Errors
/// Returns [`std::io::Error`] when an adapter cannot be built or the socket
/// cannot be bound.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let http_state = build_http_state(&config)?;
    let server_health_state = health_state.clone();
    let ServerConfig {
        session,
        bind_addr,
        ..
    } = config;

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            session: session.clone(),
        })
    })
    .disable_signals()
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}

/// Wait for `shutdown`, fail both probes, then stop the server gracefully.
pub async fn drain_on<F>(shutdown: F, health_state: web::Data<HealthState>, handle: ServerHandle)
where
    F: Future<Output = ()>,
{
    shutdown.await;
    info!("shutdown requested; draining");
    health_state.mark_draining();
    handle.stop(true).await;
}
