//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{ServiceFactory, ServiceRequest as DevRequest, ServiceResponse};
use actix_web::{App, HttpResponse, test, web};
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::domain::ports::{
    MockDashboardQuery, MockLoginService, MockNotificationCommand, MockServiceRequestCommand,
    MockServiceRequestQuery, MockStudentCommand, MockStudentQuery,
};
use crate::domain::{
    ApiResult, RequestId, RequestPayload, RequestStatus, ServiceRequest, Student, StudentId,
    XeroxOrder,
};
use crate::inbound::http::error::{json_error_handler, query_error_handler};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::{HttpState, HttpStatePorts};

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Read a response body as JSON.
pub async fn read_json(response: ServiceResponse) -> Value {
    let body = test::read_body(response).await;
    serde_json::from_slice(&body).expect("JSON response body")
}

/// `details.field` of an error payload.
pub fn error_field(payload: &Value) -> Option<&str> {
    payload
        .get("details")
        .and_then(|details| details.get("field"))
        .and_then(Value::as_str)
}

/// Driving-port mocks for handler tests. Unconfigured mocks panic when hit.
#[derive(Default)]
pub struct PortMocks {
    pub login: MockLoginService,
    pub students: MockStudentCommand,
    pub students_query: MockStudentQuery,
    pub requests: MockServiceRequestCommand,
    pub requests_query: MockServiceRequestQuery,
    pub dashboard: MockDashboardQuery,
    pub notifications: MockNotificationCommand,
}

impl PortMocks {
    /// Wrap the mocks in handler state.
    pub fn into_state(self) -> web::Data<HttpState> {
        web::Data::new(HttpState::new(HttpStatePorts {
            login: Arc::new(self.login),
            students: Arc::new(self.students),
            students_query: Arc::new(self.students_query),
            requests: Arc::new(self.requests),
            requests_query: Arc::new(self.requests_query),
            dashboard: Arc::new(self.dashboard),
            notifications: Arc::new(self.notifications),
        }))
    }
}

/// App with session support, JSON error handling, a `/test/session/{id}`
/// sign-in shortcut and the given `/api/v1` services.
pub fn test_app<F>(
    state: web::Data<HttpState>,
    configure: F,
) -> App<
    impl ServiceFactory<
        DevRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
>
where
    F: FnOnce(&mut web::ServiceConfig) + 'static,
{
    App::new()
        .app_data(state)
        .app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(query_error_handler))
        .wrap(test_session_middleware())
        .route("/test/session/{id}", web::post().to(sign_in))
        .service(web::scope("/api/v1").configure(configure))
}

async fn sign_in(session: SessionContext, path: web::Path<i64>) -> ApiResult<HttpResponse> {
    session.persist_student(StudentId::new(path.into_inner()))?;
    Ok(HttpResponse::NoContent().finish())
}

/// Request that signs in as student `id` through the test shortcut.
pub fn sign_in_request(id: i64) -> test::TestRequest {
    test::TestRequest::post().uri(&format!("/test/session/{id}"))
}

/// Session cookie set by `response`.
pub fn session_cookie(response: &ServiceResponse) -> Cookie<'static> {
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie set")
        .into_owned()
}

/// Fixed timestamp for fixtures.
pub fn fixture_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 19, 9, 30, 0)
        .single()
        .expect("valid fixture timestamp")
}

/// Student fixture with the given surrogate id.
pub fn sample_student(id: i64) -> Student {
    Student {
        id: StudentId::new(id),
        roll_number: "21CS001".to_owned(),
        name: "Asha Rao".to_owned(),
        email: "asha@example.edu".to_owned(),
        phone: "9999999999".to_owned(),
        emergency_contact: "8888888888".to_owned(),
        hostel_room: "A-101".to_owned(),
        blood_group: "O+".to_owned(),
        created_at: fixture_time(),
        updated_at: fixture_time(),
    }
}

/// Pending xerox request fixture owned by student 7.
pub fn sample_xerox_request(id: i64) -> ServiceRequest {
    ServiceRequest {
        id: RequestId::new(id),
        student_id: StudentId::new(7),
        student_name: "Asha Rao".to_owned(),
        status: RequestStatus::Pending,
        payload: RequestPayload::Xerox(XeroxOrder {
            service_type: "b&w".to_owned(),
            pages: 10,
            delivery_location: "hostel-A".to_owned(),
            instructions: None,
            contact_number: "9999999999".to_owned(),
        }),
        created_at: fixture_time(),
        updated_at: fixture_time(),
    }
}
