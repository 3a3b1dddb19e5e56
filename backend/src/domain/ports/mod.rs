//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (`*Repository`, [`PasswordHasher`], [`NotificationGateway`])
//! are implemented by outbound adapters. Driving ports (`*Command`,
//! `*Query`, [`LoginService`]) are implemented by domain services and called
//! by inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod dashboard_query;
mod identity;
mod notification_command;
mod notification_gateway;
mod password_hasher;
mod service_request_command;
mod service_request_query;
mod service_request_repository;
mod status_ledger_repository;
mod student_repository;

pub use dashboard_query::DashboardQuery;
#[cfg(test)]
pub use dashboard_query::MockDashboardQuery;
pub use identity::{LoginService, StudentCommand, StudentQuery};
#[cfg(test)]
pub use identity::{MockLoginService, MockStudentCommand, MockStudentQuery};
#[cfg(test)]
pub use notification_command::MockNotificationCommand;
pub use notification_command::NotificationCommand;
#[cfg(test)]
pub use notification_gateway::MockNotificationGateway;
pub use notification_gateway::{NotificationGateway, NotificationGatewayError};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHasher, PasswordHasherError};
#[cfg(test)]
pub use service_request_command::MockServiceRequestCommand;
pub use service_request_command::{ServiceRequestCommand, StatusUpdate};
#[cfg(test)]
pub use service_request_query::MockServiceRequestQuery;
pub use service_request_query::ServiceRequestQuery;
#[cfg(test)]
pub use service_request_repository::MockServiceRequestRepository;
pub use service_request_repository::{
    RequestCountFilter, ServiceRequestRepository, ServiceRequestRepositoryError,
};
#[cfg(test)]
pub use status_ledger_repository::MockStatusLedgerRepository;
pub use status_ledger_repository::{StatusLedgerError, StatusLedgerRepository};
#[cfg(test)]
pub use student_repository::MockStudentRepository;
pub use student_repository::{StudentRepository, StudentRepositoryError};
