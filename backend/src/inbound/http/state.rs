//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data` so they only depend
//! on driving ports and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    DashboardQuery, LoginService, NotificationCommand, ServiceRequestCommand, ServiceRequestQuery,
    StudentCommand, StudentQuery,
};

/// Parameter object bundling all port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub login: Arc<dyn LoginService>,
    pub students: Arc<dyn StudentCommand>,
    pub students_query: Arc<dyn StudentQuery>,
    pub requests: Arc<dyn ServiceRequestCommand>,
    pub requests_query: Arc<dyn ServiceRequestQuery>,
    pub dashboard: Arc<dyn DashboardQuery>,
    pub notifications: Arc<dyn NotificationCommand>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub login: Arc<dyn LoginService>,
    pub students: Arc<dyn StudentCommand>,
    pub students_query: Arc<dyn StudentQuery>,
    pub requests: Arc<dyn ServiceRequestCommand>,
    pub requests_query: Arc<dyn ServiceRequestQuery>,
    pub dashboard: Arc<dyn DashboardQuery>,
    pub notifications: Arc<dyn NotificationCommand>,
}

impl HttpState {
    /// Construct state from the port bundle.
    ///
    /// # Examples
    /// ```ignore
    /// let state = HttpState::new(HttpStatePorts {
    ///     login: identity.clone(),
    ///     students: identity.clone(),
    ///     students_query: identity,
    ///     requests: requests.clone(),
    ///     requests_query: requests,
    ///     dashboard,
    ///     notifications,
    /// });
    /// ```
    #[must_use]
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            login,
            students,
            students_query,
            requests,
            requests_query,
            dashboard,
            notifications,
        } = ports;
        Self {
            login,
            students,
            students_query,
            requests,
            requests_query,
            dashboard,
            notifications,
        }
    }
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}
