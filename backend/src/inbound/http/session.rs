//! Session helpers to keep HTTP handlers free of framework-specific logic.
//!
//! Wraps the Actix session so handlers only persist, read or clear the
//! signed-in student's id.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;

use crate::domain::{Error, StudentId};

pub(crate) const STUDENT_ID_KEY: &str = "student_id";

/// Newtype wrapper exposing student-centric session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Construct a new wrapper from the underlying Actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Persist the authenticated student's id, rotating the session cookie.
    pub fn persist_student(&self, id: StudentId) -> Result<(), Error> {
        self.0.renew();
        self.0
            .insert(STUDENT_ID_KEY, id.get())
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// Fetch the signed-in student id, if any.
    ///
    /// A cookie holding something other than an id is treated as signed out.
    pub fn student_id(&self) -> Result<Option<StudentId>, Error> {
        match self.0.get::<i64>(STUDENT_ID_KEY) {
            Ok(id) => Ok(id.map(StudentId::new)),
            Err(error) => {
                tracing::warn!(%error, "unreadable student id in session cookie");
                Ok(None)
            }
        }
    }

    /// Require a signed-in student or return `401 Unauthorized`.
    pub fn require_student_id(&self) -> Result<StudentId, Error> {
        self.student_id()?
            .ok_or_else(|| Error::unauthorized("login required"))
    }

    /// Drop every value and expire the cookie.
    pub fn clear(&self) {
        self.0.purge();
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}
