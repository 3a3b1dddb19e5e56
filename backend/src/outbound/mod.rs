//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL-backed repositories using Diesel ORM
//! - **memory**: process-local store used when no database is configured
//! - **notification**: WhatsApp delivery and its logging fallback
//! - **security**: password hashing
//!
//! Adapters are thin translators between domain types and infrastructure
//! representations. They contain no business logic.

pub mod memory;
pub mod notification;
pub mod persistence;
pub mod security;
