//! In-process adapters used when no database is configured and in tests.

mod portal_store;

pub use portal_store::InMemoryPortalStore;
