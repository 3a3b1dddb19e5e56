//! Driving port for the dashboard summary.

use async_trait::async_trait;

use crate::domain::{DashboardSnapshot, Error};

/// Domain use-case port for the combined dashboard read.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DashboardQuery: Send + Sync {
    /// Recompute the dashboard summary.
    async fn snapshot(&self) -> Result<DashboardSnapshot, Error>;
}
