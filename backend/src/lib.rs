//! Campus portal backend library.
//!
//! Hexagonal layout: [`domain`] holds entities, services and ports;
//! [`inbound`] adapts HTTP to the driving ports; [`outbound`] implements the
//! driven ports over PostgreSQL, memory, Argon2 and Twilio.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
