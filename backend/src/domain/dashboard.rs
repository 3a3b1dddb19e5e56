//! Dashboard summary over students and requests.
//!
//! The snapshot is recomputed on every call. "Today" is the server-local
//! calendar day reported by the injected clock, queried as a half-open UTC
//! range so records created just before local midnight fall on the right
//! side of the boundary.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Days, Local, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};
use mockable::Clock;

use super::identity_service::map_student_repository_error;
use super::ports::{
    DashboardQuery, RequestCountFilter, ServiceRequestRepository, StudentRepository,
};
use super::request_service::map_request_repository_error;
use super::{Error, RequestStatus, ServiceKind};

/// Counts for one variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceTally {
    /// Variant counted.
    pub kind: ServiceKind,
    /// Records currently `pending`.
    pub pending: u64,
    /// Records created today.
    pub created_today: u64,
}

/// Combined dashboard read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardSnapshot {
    /// Number of registered students.
    pub total_students: u64,
    /// Local calendar day used for the `created_today` tallies.
    pub day: NaiveDate,
    /// One tally per variant, in [`ServiceKind::ALL`] order.
    pub services: Vec<ServiceTally>,
}

impl DashboardSnapshot {
    /// Tally for one variant.
    #[must_use]
    pub fn tally(&self, kind: ServiceKind) -> Option<&ServiceTally> {
        self.services.iter().find(|tally| tally.kind == kind)
    }
}

/// Dashboard service backed by the student and request repositories.
#[derive(Clone)]
pub struct DashboardService<S, R> {
    students: Arc<S>,
    requests: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<S, R> DashboardService<S, R> {
    /// Create the service.
    pub fn new(students: Arc<S>, requests: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self {
            students,
            requests,
            clock,
        }
    }
}

#[async_trait]
impl<S, R> DashboardQuery for DashboardService<S, R>
where
    S: StudentRepository,
    R: ServiceRequestRepository,
{
    async fn snapshot(&self) -> Result<DashboardSnapshot, Error> {
        let day = self.clock.local().date_naive();
        let (from, until) = local_day_bounds(&Local, day);

        let total_students = self
            .students
            .count()
            .await
            .map_err(map_student_repository_error)?;
        let pending = self
            .requests
            .count_by_kind(&RequestCountFilter::InStatus(RequestStatus::Pending))
            .await
            .map_err(map_request_repository_error)?;
        let today = self
            .requests
            .count_by_kind(&RequestCountFilter::CreatedBetween { from, until })
            .await
            .map_err(map_request_repository_error)?;

        Ok(DashboardSnapshot {
            total_students,
            day,
            services: tallies(&pending, &today),
        })
    }
}

fn tallies(
    pending: &BTreeMap<ServiceKind, u64>,
    today: &BTreeMap<ServiceKind, u64>,
) -> Vec<ServiceTally> {
    ServiceKind::ALL
        .into_iter()
        .map(|kind| ServiceTally {
            kind,
            pending: pending.get(&kind).copied().unwrap_or(0),
            created_today: today.get(&kind).copied().unwrap_or(0),
        })
        .collect()
}

/// UTC bounds `[start, end)` of `day` in the time zone `tz`.
pub(crate) fn local_day_bounds<Tz: TimeZone>(
    tz: &Tz,
    day: NaiveDate,
) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = start_of_day(tz, day);
    let end = day
        .checked_add_days(Days::new(1))
        .map_or_else(|| start + chrono::Duration::days(1), |next| start_of_day(tz, next));
    (start, end)
}

// Midnight can be skipped by a DST jump; take the first hour that exists.
fn start_of_day<Tz: TimeZone>(tz: &Tz, day: NaiveDate) -> DateTime<Utc> {
    (0..24)
        .filter_map(|hour| NaiveTime::from_hms_opt(hour, 0, 0))
        .find_map(|time| match tz.from_local_datetime(&day.and_time(time)) {
            LocalResult::Single(at) => Some(at),
            LocalResult::Ambiguous(earliest, _) => Some(earliest),
            LocalResult::None => None,
        })
        .map_or_else(
            || day.and_time(NaiveTime::MIN).and_utc(),
            |at| at.with_timezone(&Utc),
        )
}
