//! PostgreSQL-backed request and ledger repositories using Diesel ORM.
//!
//! Every write that changes a request's status inserts its ledger entry in
//! the same transaction. Status changes are compare-and-set on the stored
//! status, so a concurrent writer makes the update affect zero rows instead
//! of overwriting a status the caller never validated against.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::dsl::count_star;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection as _, AsyncPgConnection, RunQueryDsl};
use tracing::warn;

use crate::domain::ports::{
    RequestCountFilter, ServiceRequestRepository, ServiceRequestRepositoryError,
    StatusLedgerError, StatusLedgerRepository,
};
use crate::domain::{
    NewServiceRequest, OutingNotificationFlags, RequestId, RequestPayload, RequestStatus,
    ServiceKind, ServiceRequest, StatusChange, StatusLedgerEntry, StudentId,
};

use super::diesel_error_mapping::{ConstraintViolation, constraint_violation};
use super::models::{NewServiceRequestRow, NewStatusEntryRow, ServiceRequestRow, StatusEntryRow};
use super::pool::{DbPool, PoolError};
use super::schema::{request_status_entries, service_requests, students};

/// Diesel-backed implementation of the request repository port.
#[derive(Clone)]
pub struct DieselServiceRequestRepository {
    pool: DbPool,
}

impl DieselServiceRequestRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Diesel-backed implementation of the status ledger read port.
#[derive(Clone)]
pub struct DieselStatusLedgerRepository {
    pool: DbPool,
}

impl DieselStatusLedgerRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Failure inside a transaction body: either Diesel itself or a domain-side
/// decoding problem that must still roll the transaction back.
#[derive(Debug)]
enum TxError {
    Diesel(diesel::result::Error),
    Repository(ServiceRequestRepositoryError),
}

impl From<diesel::result::Error> for TxError {
    fn from(error: diesel::result::Error) -> Self {
        Self::Diesel(error)
    }
}

impl From<TxError> for ServiceRequestRepositoryError {
    fn from(error: TxError) -> Self {
        match error {
            TxError::Diesel(error) => map_diesel_error(error),
            TxError::Repository(error) => error,
        }
    }
}

fn map_pool_error(error: PoolError) -> ServiceRequestRepositoryError {
    super::diesel_error_mapping::map_pool_error(error, ServiceRequestRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> ServiceRequestRepositoryError {
    super::diesel_error_mapping::map_diesel_error(
        error,
        ServiceRequestRepositoryError::query,
        ServiceRequestRepositoryError::connection,
    )
}

fn map_create_error(error: TxError, student_id: StudentId) -> ServiceRequestRepositoryError {
    if let TxError::Diesel(diesel_error) = &error {
        if let Some(ConstraintViolation::ForeignKey { constraint }) =
            constraint_violation(diesel_error)
        {
            if constraint.as_deref() != Some("service_requests_student_id_fkey") {
                warn!(?constraint, "unexpected foreign key violation on request insert");
            }
            return ServiceRequestRepositoryError::student_missing(student_id);
        }
    }
    error.into()
}

fn map_ledger_pool_error(error: PoolError) -> StatusLedgerError {
    super::diesel_error_mapping::map_pool_error(error, StatusLedgerError::connection)
}

fn map_ledger_diesel_error(error: diesel::result::Error) -> StatusLedgerError {
    super::diesel_error_mapping::map_diesel_error(
        error,
        StatusLedgerError::query,
        StatusLedgerError::connection,
    )
}

fn parse_kind(raw: &str) -> Result<ServiceKind, String> {
    raw.parse()
        .map_err(|_| format!("unknown request kind '{raw}' in storage"))
}

fn parse_status(raw: &str) -> Result<RequestStatus, String> {
    raw.parse()
        .map_err(|_| format!("unknown request status '{raw}' in storage"))
}

fn row_to_request(
    row: ServiceRequestRow,
    student_name: String,
) -> Result<ServiceRequest, ServiceRequestRepositoryError> {
    let kind = parse_kind(&row.kind).map_err(ServiceRequestRepositoryError::query)?;
    let status = parse_status(&row.status).map_err(ServiceRequestRepositoryError::query)?;
    let payload = RequestPayload::from_value(kind, row.payload).map_err(|err| {
        ServiceRequestRepositoryError::query(format!("decode {kind} payload: {err}"))
    })?;
    Ok(ServiceRequest {
        id: RequestId::new(row.id),
        student_id: StudentId::new(row.student_id),
        student_name,
        status,
        payload,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

fn row_to_entry(row: StatusEntryRow) -> Result<StatusLedgerEntry, StatusLedgerError> {
    Ok(StatusLedgerEntry {
        id: row.id,
        kind: parse_kind(&row.request_kind).map_err(StatusLedgerError::query)?,
        request_id: RequestId::new(row.request_id),
        status: parse_status(&row.status).map_err(StatusLedgerError::query)?,
        updated_by: row.updated_by,
        notes: row.notes,
        created_at: row.created_at,
    })
}

fn encode_payload(
    payload: &RequestPayload,
) -> Result<serde_json::Value, ServiceRequestRepositoryError> {
    payload.to_value().map_err(|err| {
        ServiceRequestRepositoryError::query(format!("encode {} payload: {err}", payload.kind()))
    })
}

async fn student_name(
    conn: &mut AsyncPgConnection,
    student_id: i64,
) -> Result<String, diesel::result::Error> {
    students::table
        .find(student_id)
        .select(students::name)
        .first(conn)
        .await
}

async fn append_entry(
    conn: &mut AsyncPgConnection,
    entry: NewStatusEntryRow<'_>,
) -> Result<(), diesel::result::Error> {
    diesel::insert_into(request_status_entries::table)
        .values(&entry)
        .execute(conn)
        .await
        .map(|_| ())
}

#[async_trait]
impl ServiceRequestRepository for DieselServiceRequestRepository {
    async fn create(
        &self,
        request: &NewServiceRequest,
    ) -> Result<ServiceRequest, ServiceRequestRepositoryError> {
        let payload = encode_payload(&request.payload)?;
        let kind = request.kind();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let (row, name) = conn
            .transaction::<_, TxError, _>(|conn| {
                async move {
                    let row: ServiceRequestRow = diesel::insert_into(service_requests::table)
                        .values(&NewServiceRequestRow {
                            kind: kind.as_str(),
                            student_id: request.student_id.get(),
                            status: RequestStatus::Pending.as_str(),
                            payload: &payload,
                            created_at: request.submitted_at,
                            updated_at: request.submitted_at,
                        })
                        .returning(ServiceRequestRow::as_returning())
                        .get_result(conn)
                        .await?;
                    append_entry(
                        conn,
                        NewStatusEntryRow {
                            request_kind: kind.as_str(),
                            request_id: row.id,
                            status: RequestStatus::Pending.as_str(),
                            updated_by: None,
                            notes: Some(request.notes.as_str()),
                            created_at: request.submitted_at,
                        },
                    )
                    .await?;
                    let name = student_name(conn, row.student_id).await?;
                    Ok((row, name))
                }
                .scope_boxed()
            })
            .await
            .map_err(|err| map_create_error(err, request.student_id))?;

        row_to_request(row, name)
    }

    async fn find(
        &self,
        kind: ServiceKind,
        id: RequestId,
    ) -> Result<Option<ServiceRequest>, ServiceRequestRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let found: Option<(ServiceRequestRow, String)> = service_requests::table
            .inner_join(students::table)
            .filter(service_requests::id.eq(id.get()))
            .filter(service_requests::kind.eq(kind.as_str()))
            .select((ServiceRequestRow::as_select(), students::name))
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        found
            .map(|(row, name)| row_to_request(row, name))
            .transpose()
    }

    async fn list(
        &self,
        kind: ServiceKind,
        student_id: Option<StudentId>,
    ) -> Result<Vec<ServiceRequest>, ServiceRequestRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = service_requests::table
            .inner_join(students::table)
            .filter(service_requests::kind.eq(kind.as_str()))
            .select((ServiceRequestRow::as_select(), students::name))
            .into_boxed();
        if let Some(owner) = student_id {
            query = query.filter(service_requests::student_id.eq(owner.get()));
        }

        let rows: Vec<(ServiceRequestRow, String)> = query
            .order((
                service_requests::created_at.desc(),
                service_requests::id.desc(),
            ))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter()
            .map(|(row, name)| row_to_request(row, name))
            .collect()
    }

    async fn apply_status_change(
        &self,
        change: &StatusChange,
    ) -> Result<Option<ServiceRequest>, ServiceRequestRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let updated = conn
            .transaction::<_, TxError, _>(|conn| {
                async move {
                    let row: Option<ServiceRequestRow> = diesel::update(
                        service_requests::table
                            .filter(service_requests::id.eq(change.request_id.get()))
                            .filter(service_requests::kind.eq(change.kind.as_str()))
                            .filter(service_requests::status.eq(change.expected.as_str())),
                    )
                    .set((
                        service_requests::status.eq(change.next.as_str()),
                        service_requests::updated_at.eq(change.changed_at),
                    ))
                    .returning(ServiceRequestRow::as_returning())
                    .get_result(conn)
                    .await
                    .optional()?;
                    let Some(row) = row else {
                        return Ok(None);
                    };

                    append_entry(
                        conn,
                        NewStatusEntryRow {
                            request_kind: change.kind.as_str(),
                            request_id: row.id,
                            status: change.next.as_str(),
                            updated_by: change.updated_by.as_deref(),
                            notes: change.notes.as_deref(),
                            created_at: change.changed_at,
                        },
                    )
                    .await?;
                    let name = student_name(conn, row.student_id).await?;
                    Ok(Some((row, name)))
                }
                .scope_boxed()
            })
            .await
            .map_err(ServiceRequestRepositoryError::from)?;

        updated
            .map(|(row, name)| row_to_request(row, name))
            .transpose()
    }

    async fn set_outing_flags(
        &self,
        id: RequestId,
        flags: &OutingNotificationFlags,
        changed_at: DateTime<Utc>,
    ) -> Result<Option<ServiceRequest>, ServiceRequestRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let kind = ServiceKind::Outing.as_str();

        let updated = conn
            .transaction::<_, TxError, _>(|conn| {
                async move {
                    let current: Option<ServiceRequestRow> = service_requests::table
                        .filter(service_requests::id.eq(id.get()))
                        .filter(service_requests::kind.eq(kind))
                        .select(ServiceRequestRow::as_select())
                        .for_update()
                        .first(conn)
                        .await
                        .optional()?;
                    let Some(current) = current else {
                        return Ok(None);
                    };

                    let mut payload =
                        RequestPayload::from_value(ServiceKind::Outing, current.payload)
                            .map_err(|err| {
                                TxError::Repository(ServiceRequestRepositoryError::query(
                                    format!("decode outing payload: {err}"),
                                ))
                            })?;
                    flags.apply_to(&mut payload);
                    let encoded = encode_payload(&payload).map_err(TxError::Repository)?;

                    let row: ServiceRequestRow =
                        diesel::update(service_requests::table.find(current.id))
                            .set((
                                service_requests::payload.eq(&encoded),
                                service_requests::updated_at.eq(changed_at),
                            ))
                            .returning(ServiceRequestRow::as_returning())
                            .get_result(conn)
                            .await?;
                    let name = student_name(conn, row.student_id).await?;
                    Ok(Some((row, name)))
                }
                .scope_boxed()
            })
            .await
            .map_err(ServiceRequestRepositoryError::from)?;

        updated
            .map(|(row, name)| row_to_request(row, name))
            .transpose()
    }

    async fn count_by_kind(
        &self,
        filter: &RequestCountFilter,
    ) -> Result<BTreeMap<ServiceKind, u64>, ServiceRequestRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<(String, i64)> = match *filter {
            RequestCountFilter::InStatus(status) => service_requests::table
                .filter(service_requests::status.eq(status.as_str()))
                .group_by(service_requests::kind)
                .select((service_requests::kind, count_star()))
                .load(&mut conn)
                .await
                .map_err(map_diesel_error)?,
            RequestCountFilter::CreatedBetween { from, until } => service_requests::table
                .filter(service_requests::created_at.ge(from))
                .filter(service_requests::created_at.lt(until))
                .group_by(service_requests::kind)
                .select((service_requests::kind, count_star()))
                .load(&mut conn)
                .await
                .map_err(map_diesel_error)?,
        };

        rows.into_iter()
            .map(|(kind, total)| {
                let kind = parse_kind(&kind).map_err(ServiceRequestRepositoryError::query)?;
                let total = u64::try_from(total)
                    .map_err(|_| ServiceRequestRepositoryError::query("negative request count"))?;
                Ok((kind, total))
            })
            .collect()
    }
}

#[async_trait]
impl StatusLedgerRepository for DieselStatusLedgerRepository {
    async fn history(
        &self,
        kind: ServiceKind,
        request_id: RequestId,
    ) -> Result<Vec<StatusLedgerEntry>, StatusLedgerError> {
        let mut conn = self.pool.get().await.map_err(map_ledger_pool_error)?;
        let rows: Vec<StatusEntryRow> = request_status_entries::table
            .filter(request_status_entries::request_kind.eq(kind.as_str()))
            .filter(request_status_entries::request_id.eq(request_id.get()))
            .order((
                request_status_entries::created_at.desc(),
                request_status_entries::id.desc(),
            ))
            .select(StatusEntryRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_ledger_diesel_error)?;
        rows.into_iter().map(row_to_entry).collect()
    }
}
