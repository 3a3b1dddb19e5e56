//! Tests for student identity handlers.

use super::*;
use crate::domain::UniqueStudentField;
use crate::inbound::http::test_utils::{
    PortMocks, error_field, read_json, sample_student, session_cookie, sign_in_request, test_app,
};
use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use mockall::predicate::eq;
use rstest::rstest;
use serde_json::{Value, json};

fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(register)
        .service(login)
        .service(logout)
        .service(current_student)
        .service(update_profile)
        .service(list_students)
        .service(get_student);
}

fn registration_body() -> Value {
    json!({
        "studentId": "21CS001",
        "name": "Asha Rao",
        "email": "Asha@Example.edu",
        "phone": "9999999999",
        "password": "hunter2",
        "emergencyContact": "8888888888",
        "hostelRoom": "A-101",
        "bloodGroup": "O+"
    })
}

#[actix_web::test]
async fn register_returns_created_student_without_hash() {
    let mut mocks = PortMocks::default();
    mocks
        .students
        .expect_register()
        .withf(|registration| {
            registration.roll_number() == "21CS001" && registration.email() == "asha@example.edu"
        })
        .times(1)
        .returning(|_| Ok(sample_student(7)));
    let app = actix_test::init_service(test_app(mocks.into_state(), routes)).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/students")
            .set_json(registration_body())
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = read_json(response).await;
    assert_eq!(body["id"], 7);
    assert_eq!(body["studentId"], "21CS001");
    assert!(body.get("passwordHash").is_none());
    assert!(body.get("password").is_none());
}

#[rstest]
#[case("studentId", "student_id")]
#[case("email", "email")]
#[case("password", "password")]
#[case("bloodGroup", "blood_group")]
#[actix_web::test]
async fn register_names_the_missing_field(#[case] wire: &str, #[case] field: &str) {
    let app = actix_test::init_service(test_app(PortMocks::default().into_state(), routes)).await;
    let mut body = registration_body();
    body.as_object_mut().expect("object").remove(wire);

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/students")
            .set_json(body)
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let payload = read_json(response).await;
    assert_eq!(error_field(&payload), Some(field));
    assert_eq!(payload["details"]["code"], "missing_field");
}

#[actix_web::test]
async fn register_conflict_reports_field() {
    let mut mocks = PortMocks::default();
    mocks
        .students
        .expect_register()
        .returning(|_| Err(UniqueStudentField::Phone.conflict_error()));
    let app = actix_test::init_service(test_app(mocks.into_state(), routes)).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/students")
            .set_json(registration_body())
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let payload = read_json(response).await;
    assert_eq!(error_field(&payload), Some("phone"));
    assert_eq!(payload["details"]["code"], "duplicate_phone");
}

#[actix_web::test]
async fn login_starts_a_session_for_me() {
    let mut mocks = PortMocks::default();
    mocks
        .login
        .expect_authenticate()
        .withf(|credentials| {
            credentials.login_id() == "21CS001" && credentials.password() == "hunter2"
        })
        .returning(|_| Ok(sample_student(7)));
    mocks
        .students_query
        .expect_get_student()
        .with(eq(StudentId::new(7)))
        .returning(|id| Ok(sample_student(id.get())));
    let app = actix_test::init_service(test_app(mocks.into_state(), routes)).await;

    let login_response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/login")
            .set_json(json!({"loginId": " 21CS001 ", "password": "hunter2"}))
            .to_request(),
    )
    .await;
    assert_eq!(login_response.status(), StatusCode::OK);
    let cookie = session_cookie(&login_response);

    let me = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/students/me")
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(me.status(), StatusCode::OK);
    assert_eq!(read_json(me).await["name"], "Asha Rao");
}

#[actix_web::test]
async fn login_failure_is_generic_unauthorised() {
    let mut mocks = PortMocks::default();
    mocks
        .login
        .expect_authenticate()
        .returning(|_| Err(Error::unauthorized("invalid credentials")));
    let app = actix_test::init_service(test_app(mocks.into_state(), routes)).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/login")
            .set_json(json!({"loginId": "99NOPE", "password": "anything"}))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let cookie_set = response
        .response()
        .cookies()
        .any(|cookie| cookie.name() == "session");
    assert!(!cookie_set);
    let payload = read_json(response).await;
    assert_eq!(payload["message"], "invalid credentials");
}

#[rstest]
#[case(json!({"loginId": "  ", "password": "pw"}), "login_id")]
#[case(json!({"loginId": "21CS001", "password": ""}), "password")]
#[actix_web::test]
async fn login_rejects_blank_inputs(#[case] body: Value, #[case] field: &str) {
    let app = actix_test::init_service(test_app(PortMocks::default().into_state(), routes)).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/login")
            .set_json(body)
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_field(&read_json(response).await), Some(field));
}

#[rstest]
#[case("/api/v1/students/me")]
#[case("/api/v1/students")]
#[case("/api/v1/students/3")]
#[actix_web::test]
async fn reads_require_login(#[case] uri: &str) {
    let app = actix_test::init_service(test_app(PortMocks::default().into_state(), routes)).await;

    let response =
        actix_test::call_service(&app, actix_test::TestRequest::get().uri(uri).to_request()).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let payload = read_json(response).await;
    assert_eq!(payload["code"], "unauthorized");
    assert_eq!(payload["message"], "login required");
}

#[actix_web::test]
async fn update_profile_applies_to_the_session_student() {
    let mut mocks = PortMocks::default();
    mocks
        .students
        .expect_update_profile()
        .withf(|id, changes| {
            *id == StudentId::new(7)
                && changes.hostel_room.as_deref() == Some("B-204")
                && changes.email.is_none()
        })
        .returning(|id, _| {
            let mut student = sample_student(id.get());
            student.hostel_room = "B-204".to_owned();
            Ok(student)
        });
    let app = actix_test::init_service(test_app(mocks.into_state(), routes)).await;
    let signed_in = actix_test::call_service(&app, sign_in_request(7).to_request()).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::patch()
            .uri("/api/v1/students/me")
            .cookie(session_cookie(&signed_in))
            .set_json(json!({"hostelRoom": "B-204"}))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await["hostelRoom"], "B-204");
}

#[actix_web::test]
async fn get_student_maps_not_found() {
    let mut mocks = PortMocks::default();
    mocks
        .students_query
        .expect_get_student()
        .with(eq(StudentId::new(99)))
        .returning(|_| Err(Error::not_found("student 99 not found")));
    let app = actix_test::init_service(test_app(mocks.into_state(), routes)).await;
    let signed_in = actix_test::call_service(&app, sign_in_request(7).to_request()).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/students/99")
            .cookie(session_cookie(&signed_in))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(read_json(response).await["code"], "not_found");
}

#[actix_web::test]
async fn store_outage_lists_as_service_unavailable() {
    let mut mocks = PortMocks::default();
    mocks
        .students_query
        .expect_list_students()
        .returning(|| Err(Error::service_unavailable("student store unavailable")));
    let app = actix_test::init_service(test_app(mocks.into_state(), routes)).await;
    let signed_in = actix_test::call_service(&app, sign_in_request(7).to_request()).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/students")
            .cookie(session_cookie(&signed_in))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let payload = read_json(response).await;
    assert_eq!(payload["code"], "service_unavailable");
}

#[actix_web::test]
async fn logout_expires_the_session() {
    let app = actix_test::init_service(test_app(PortMocks::default().into_state(), routes)).await;
    let signed_in = actix_test::call_service(&app, sign_in_request(7).to_request()).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/logout")
            .cookie(session_cookie(&signed_in))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(session_cookie(&response).value(), "");
}
