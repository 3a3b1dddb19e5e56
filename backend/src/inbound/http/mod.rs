//! HTTP inbound adapter exposing the portal's REST endpoints.

pub mod dashboard;
pub mod error;
pub mod health;
pub mod notifications;
pub mod requests;
pub mod schemas;
pub mod session;
pub mod session_config;
pub mod state;
pub mod students;
#[cfg(test)]
pub mod test_utils;
