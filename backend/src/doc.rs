//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every portal endpoint, the schema wrappers for
//! domain types and the session cookie security scheme. The document backs
//! Swagger UI in debug builds and is exported by the `openapi-dump` binary.

use crate::inbound::http::dashboard::{DashboardResponse, ServiceTallyResponse};
use crate::inbound::http::health::ProbeResponse;
use crate::inbound::http::notifications::{
    DispositionResponse, NotificationRequest, NotificationResponse,
};
use crate::inbound::http::requests::{
    OutingNotificationsRequest, RequestResponse, StatusEntryResponse, StatusUpdateRequest,
};
use crate::inbound::http::schemas::{
    ErrorCodeSchema, ErrorSchema, RequestStatusSchema, ServiceKindSchema,
};
use crate::inbound::http::students::{
    LoginRequest, ProfileUpdateRequest, RegisterRequest, StudentResponse,
};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Adds the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/login.",
            ))),
        );
    }
}

/// OpenAPI document for the portal API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Campus portal API",
        description = "Student identity, campus service requests, dashboard counts and WhatsApp notifications."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::students::register,
        crate::inbound::http::students::login,
        crate::inbound::http::students::logout,
        crate::inbound::http::students::current_student,
        crate::inbound::http::students::update_profile,
        crate::inbound::http::students::list_students,
        crate::inbound::http::students::get_student,
        crate::inbound::http::requests::create_request,
        crate::inbound::http::requests::list_requests,
        crate::inbound::http::requests::get_request,
        crate::inbound::http::requests::update_status,
        crate::inbound::http::requests::status_history,
        crate::inbound::http::requests::set_outing_notifications,
        crate::inbound::http::dashboard::dashboard,
        crate::inbound::http::notifications::send_notification,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        ServiceKindSchema,
        RequestStatusSchema,
        RegisterRequest,
        LoginRequest,
        ProfileUpdateRequest,
        StudentResponse,
        RequestResponse,
        StatusEntryResponse,
        StatusUpdateRequest,
        OutingNotificationsRequest,
        DashboardResponse,
        ServiceTallyResponse,
        NotificationRequest,
        NotificationResponse,
        DispositionResponse,
        ProbeResponse
    )),
    tags(
        (name = "students", description = "Registration, login and profiles"),
        (name = "requests", description = "Outing, xerox, mess, fivestar, ccd and stationary requests"),
        (name = "dashboard", description = "Portal-wide counts"),
        (name = "notifications", description = "Direct WhatsApp messages"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Tests verifying the generated document.

    use super::*;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[test]
    fn error_schema_has_wire_fields() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let error_schema = schemas.get("Error").expect("Error schema");

        assert_object_schema_has_field(error_schema, "code");
        assert_object_schema_has_field(error_schema, "message");
        assert_object_schema_has_field(error_schema, "traceId");
    }

    #[test]
    fn request_schema_carries_kind_and_details() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let request_schema = schemas.get("RequestResponse").expect("RequestResponse schema");

        assert_object_schema_has_field(request_schema, "kind");
        assert_object_schema_has_field(request_schema, "details");
        assert_object_schema_has_field(request_schema, "studentName");
    }

    #[test]
    fn every_route_is_documented() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/v1/students",
            "/api/v1/login",
            "/api/v1/logout",
            "/api/v1/students/me",
            "/api/v1/students/{id}",
            "/api/v1/requests/{kind}",
            "/api/v1/requests/{kind}/{id}",
            "/api/v1/requests/{kind}/{id}/status",
            "/api/v1/requests/{kind}/{id}/history",
            "/api/v1/requests/outing/{id}/notifications",
            "/api/v1/dashboard",
            "/api/v1/notifications",
            "/health/ready",
            "/health/live",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing path {path}");
        }
    }

    #[test]
    fn session_cookie_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("SessionCookie"));
    }
}
