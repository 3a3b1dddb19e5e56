//! Student identity API handlers.
//!
//! ```text
//! POST  /api/v1/students {"studentId":"21CS001","name":"Asha Rao",...}
//! POST  /api/v1/login    {"loginId":"21CS001","password":"..."}
//! POST  /api/v1/logout
//! GET   /api/v1/students/me
//! PATCH /api/v1/students/me {"hostelRoom":"B-204"}
//! GET   /api/v1/students
//! GET   /api/v1/students/{id}
//! ```

use actix_web::{HttpResponse, get, patch, post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use zeroize::Zeroizing;

use crate::domain::{
    ApiResult, Error, LoginCredentials, LoginValidationError, ProfileChanges, ProfileDraft,
    Student, StudentDraft, StudentId, StudentRegistration,
};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Registration body for `POST /api/v1/students`.
///
/// Fields are optional at the wire level so a missing field is reported by
/// name rather than as a malformed body.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[schema(example = "21CS001")]
    pub student_id: Option<String>,
    #[schema(example = "Asha Rao")]
    pub name: Option<String>,
    #[schema(example = "asha@example.edu")]
    pub email: Option<String>,
    #[schema(example = "9999999999")]
    pub phone: Option<String>,
    pub password: Option<String>,
    #[schema(example = "8888888888")]
    pub emergency_contact: Option<String>,
    #[schema(example = "A-101")]
    pub hostel_room: Option<String>,
    #[schema(example = "O+")]
    pub blood_group: Option<String>,
}

impl From<RegisterRequest> for StudentDraft {
    fn from(value: RegisterRequest) -> Self {
        Self {
            student_id: value.student_id,
            name: value.name,
            email: value.email,
            phone: value.phone,
            password: value.password.map(Zeroizing::new),
            emergency_contact: value.emergency_contact,
            hostel_room: value.hostel_room,
            blood_group: value.blood_group,
        }
    }
}

/// Login body for `POST /api/v1/login`. `loginId` is a roll number or phone.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[serde(alias = "studentId")]
    #[schema(example = "21CS001")]
    pub login_id: String,
    pub password: String,
}

impl TryFrom<LoginRequest> for LoginCredentials {
    type Error = LoginValidationError;

    fn try_from(value: LoginRequest) -> Result<Self, Self::Error> {
        let password = Zeroizing::new(value.password);
        Self::try_from_parts(&value.login_id, password.as_str())
    }
}

/// Profile update body for `PATCH /api/v1/students/me`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdateRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub emergency_contact: Option<String>,
    pub hostel_room: Option<String>,
    pub blood_group: Option<String>,
}

impl From<ProfileUpdateRequest> for ProfileDraft {
    fn from(value: ProfileUpdateRequest) -> Self {
        Self {
            name: value.name,
            email: value.email,
            phone: value.phone,
            emergency_contact: value.emergency_contact,
            hostel_room: value.hostel_room,
            blood_group: value.blood_group,
        }
    }
}

/// Public view of a student. The password hash never leaves the domain.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudentResponse {
    /// Surrogate identifier used in request records and paths.
    pub id: i64,
    /// Roll number.
    #[schema(example = "21CS001")]
    pub student_id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub emergency_contact: String,
    pub hostel_room: String,
    pub blood_group: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Student> for StudentResponse {
    fn from(value: Student) -> Self {
        Self {
            id: value.id.get(),
            student_id: value.roll_number,
            name: value.name,
            email: value.email,
            phone: value.phone,
            emergency_contact: value.emergency_contact,
            hostel_room: value.hostel_room,
            blood_group: value.blood_group,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

fn map_login_validation_error(err: LoginValidationError) -> Error {
    Error::invalid_request(err.to_string())
        .with_details(json!({ "field": err.field(), "code": "missing_field" }))
}

/// Register a new student account.
#[utoipa::path(
    post,
    path = "/api/v1/students",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Student registered", body = StudentResponse),
        (status = 400, description = "Missing or invalid field", body = ErrorSchema),
        (status = 409, description = "Roll number, email or phone already registered", body = ErrorSchema),
        (status = 503, description = "Store unavailable", body = ErrorSchema)
    ),
    tags = ["students"],
    operation_id = "registerStudent",
    security([])
)]
#[post("/students")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let registration = StudentRegistration::try_from_draft(payload.into_inner().into())?;
    let student = state.students.register(registration).await?;
    Ok(HttpResponse::Created().json(StudentResponse::from(student)))
}

/// Authenticate and establish a session.
///
/// Unknown accounts and wrong passwords produce the same response.
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = StudentResponse,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Invalid credentials", body = ErrorSchema),
        (status = 503, description = "Store unavailable", body = ErrorSchema)
    ),
    tags = ["students"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<StudentResponse>> {
    let credentials =
        LoginCredentials::try_from(payload.into_inner()).map_err(map_login_validation_error)?;
    let student = state.login.authenticate(&credentials).await?;
    session.persist_student(student.id)?;
    Ok(web::Json(student.into()))
}

/// End the current session.
#[utoipa::path(
    post,
    path = "/api/v1/logout",
    responses((status = 204, description = "Session cleared")),
    tags = ["students"],
    operation_id = "logout",
    security([])
)]
#[post("/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.clear();
    HttpResponse::NoContent().finish()
}

/// Fetch the signed-in student.
#[utoipa::path(
    get,
    path = "/api/v1/students/me",
    responses(
        (status = 200, description = "Current student", body = StudentResponse),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 404, description = "Account no longer exists", body = ErrorSchema)
    ),
    tags = ["students"],
    operation_id = "currentStudent"
)]
#[get("/students/me")]
pub async fn current_student(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<StudentResponse>> {
    let id = session.require_student_id()?;
    let student = state.students_query.get_student(id).await?;
    Ok(web::Json(student.into()))
}

/// Update the signed-in student's profile.
#[utoipa::path(
    patch,
    path = "/api/v1/students/me",
    request_body = ProfileUpdateRequest,
    responses(
        (status = 200, description = "Updated student", body = StudentResponse),
        (status = 400, description = "Blank or invalid field", body = ErrorSchema),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 409, description = "Email or phone taken by another student", body = ErrorSchema)
    ),
    tags = ["students"],
    operation_id = "updateProfile"
)]
#[patch("/students/me")]
pub async fn update_profile(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<ProfileUpdateRequest>,
) -> ApiResult<web::Json<StudentResponse>> {
    let id = session.require_student_id()?;
    let changes = ProfileChanges::try_from_draft(payload.into_inner().into())?;
    let student = state.students.update_profile(id, changes).await?;
    Ok(web::Json(student.into()))
}

/// List registered students, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/students",
    responses(
        (status = 200, description = "Students", body = [StudentResponse]),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 503, description = "Store unavailable", body = ErrorSchema)
    ),
    tags = ["students"],
    operation_id = "listStudents"
)]
#[get("/students")]
pub async fn list_students(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<StudentResponse>>> {
    session.require_student_id()?;
    let students = state.students_query.list_students().await?;
    Ok(web::Json(students.into_iter().map(Into::into).collect()))
}

/// Fetch one student by surrogate id.
#[utoipa::path(
    get,
    path = "/api/v1/students/{id}",
    params(("id" = i64, Path, description = "Student identifier")),
    responses(
        (status = 200, description = "Student", body = StudentResponse),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 404, description = "No such student", body = ErrorSchema)
    ),
    tags = ["students"],
    operation_id = "getStudent"
)]
#[get("/students/{id}")]
pub async fn get_student(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
) -> ApiResult<web::Json<StudentResponse>> {
    session.require_student_id()?;
    let student = state
        .students_query
        .get_student(StudentId::new(path.into_inner()))
        .await?;
    Ok(web::Json(student.into()))
}

#[cfg(test)]
mod tests;
