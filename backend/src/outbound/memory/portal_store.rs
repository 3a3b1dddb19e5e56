//! Mutex-guarded store implementing the student, request and ledger ports.
//!
//! Every write runs under one lock, so a request and its ledger entry become
//! visible together. A poisoned lock surfaces as a query error rather than a
//! panic.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::ports::{
    RequestCountFilter, ServiceRequestRepository, ServiceRequestRepositoryError,
    StatusLedgerError, StatusLedgerRepository, StudentRepository, StudentRepositoryError,
};
use crate::domain::{
    NewServiceRequest, NewStudent, OutingNotificationFlags, PasswordDigest, ProfileChanges,
    RequestId, RequestPayload, RequestStatus, ServiceKind, ServiceRequest, StatusChange,
    StatusLedgerEntry, StoredCredentials, Student, StudentId, UniquenessProbe,
};

#[derive(Debug, Clone)]
struct StoredStudent {
    student: Student,
    digest: PasswordDigest,
}

#[derive(Debug, Clone)]
struct StoredRequest {
    id: RequestId,
    student_id: StudentId,
    status: RequestStatus,
    payload: RequestPayload,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct PortalState {
    students: Vec<StoredStudent>,
    requests: Vec<StoredRequest>,
    ledger: Vec<StatusLedgerEntry>,
    next_student_id: i64,
    next_request_id: i64,
    next_entry_id: i64,
}

impl PortalState {
    fn student(&self, id: StudentId) -> Option<&StoredStudent> {
        self.students.iter().find(|stored| stored.student.id == id)
    }

    fn snapshot(&self, request: &StoredRequest) -> ServiceRequest {
        let student_name = self
            .student(request.student_id)
            .map(|stored| stored.student.name.clone())
            .unwrap_or_default();
        ServiceRequest {
            id: request.id,
            student_id: request.student_id,
            student_name,
            status: request.status,
            payload: request.payload.clone(),
            created_at: request.created_at,
            updated_at: request.updated_at,
        }
    }

    fn request_index(&self, kind: ServiceKind, id: RequestId) -> Option<usize> {
        self.requests
            .iter()
            .position(|request| request.id == id && request.payload.kind() == kind)
    }

    fn append_entry(
        &mut self,
        kind: ServiceKind,
        request_id: RequestId,
        status: RequestStatus,
        updated_by: Option<String>,
        notes: Option<String>,
        created_at: DateTime<Utc>,
    ) {
        self.next_entry_id += 1;
        self.ledger.push(StatusLedgerEntry {
            id: self.next_entry_id,
            kind,
            request_id,
            status,
            updated_by,
            notes,
            created_at,
        });
    }
}

/// In-memory implementation of the persistence ports.
///
/// # Examples
/// ```
/// use std::sync::Arc;
/// use campus_portal::outbound::memory::InMemoryPortalStore;
///
/// let store = Arc::new(InMemoryPortalStore::default());
/// let _students = Arc::clone(&store);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryPortalStore {
    state: Mutex<PortalState>,
}

impl InMemoryPortalStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_for<E>(&self, poisoned: impl FnOnce(String) -> E) -> Result<MutexGuard<'_, PortalState>, E> {
        self.state
            .lock()
            .map_err(|err| poisoned(format!("in-memory store lock poisoned: {err}")))
    }

    fn students(&self) -> Result<MutexGuard<'_, PortalState>, StudentRepositoryError> {
        self.lock_for(StudentRepositoryError::query)
    }

    fn requests(&self) -> Result<MutexGuard<'_, PortalState>, ServiceRequestRepositoryError> {
        self.lock_for(ServiceRequestRepositoryError::query)
    }
}

fn newest_first<T>(items: &mut [T], key: impl Fn(&T) -> (DateTime<Utc>, i64)) {
    items.sort_by(|left, right| key(right).cmp(&key(left)));
}

#[async_trait]
impl StudentRepository for InMemoryPortalStore {
    async fn insert(&self, student: &NewStudent) -> Result<Student, StudentRepositoryError> {
        let mut state = self.students()?;
        let probe = UniquenessProbe {
            roll_number: Some(student.roll_number.clone()),
            email: Some(student.email.clone()),
            phone: Some(student.phone.clone()),
        };
        let existing: Vec<Student> = state
            .students
            .iter()
            .map(|stored| stored.student.clone())
            .collect();
        if let Some(field) = probe.first_conflict(&existing, None) {
            return Err(StudentRepositoryError::duplicate(field));
        }

        state.next_student_id += 1;
        let stored = Student {
            id: StudentId::new(state.next_student_id),
            roll_number: student.roll_number.clone(),
            name: student.name.clone(),
            email: student.email.clone(),
            phone: student.phone.clone(),
            emergency_contact: student.emergency_contact.clone(),
            hostel_room: student.hostel_room.clone(),
            blood_group: student.blood_group.clone(),
            created_at: student.created_at,
            updated_at: student.created_at,
        };
        state.students.push(StoredStudent {
            student: stored.clone(),
            digest: student.digest.clone(),
        });
        Ok(stored)
    }

    async fn find_by_id(&self, id: StudentId) -> Result<Option<Student>, StudentRepositoryError> {
        let state = self.students()?;
        Ok(state.student(id).map(|stored| stored.student.clone()))
    }

    async fn find_credentials(
        &self,
        login_id: &str,
    ) -> Result<Option<StoredCredentials>, StudentRepositoryError> {
        let state = self.students()?;
        let by_roll = state
            .students
            .iter()
            .find(|stored| stored.student.roll_number == login_id);
        let found = by_roll.or_else(|| {
            state
                .students
                .iter()
                .find(|stored| stored.student.phone == login_id)
        });
        Ok(found.map(|stored| StoredCredentials {
            student: stored.student.clone(),
            digest: stored.digest.clone(),
        }))
    }

    async fn find_conflicts(
        &self,
        probe: &UniquenessProbe,
    ) -> Result<Vec<Student>, StudentRepositoryError> {
        let state = self.students()?;
        Ok(state
            .students
            .iter()
            .filter(|stored| probe.matches(&stored.student))
            .map(|stored| stored.student.clone())
            .collect())
    }

    async fn list(&self) -> Result<Vec<Student>, StudentRepositoryError> {
        let state = self.students()?;
        let mut students: Vec<Student> = state
            .students
            .iter()
            .map(|stored| stored.student.clone())
            .collect();
        newest_first(&mut students, |student| (student.created_at, student.id.get()));
        Ok(students)
    }

    async fn count(&self) -> Result<u64, StudentRepositoryError> {
        let state = self.students()?;
        Ok(state.students.len() as u64)
    }

    async fn update_profile(
        &self,
        id: StudentId,
        changes: &ProfileChanges,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Student>, StudentRepositoryError> {
        let mut state = self.students()?;
        let others: Vec<Student> = state
            .students
            .iter()
            .map(|stored| stored.student.clone())
            .collect();
        if let Some(field) = changes.uniqueness_probe().first_conflict(&others, Some(id)) {
            return Err(StudentRepositoryError::duplicate(field));
        }
        let Some(stored) = state
            .students
            .iter_mut()
            .find(|stored| stored.student.id == id)
        else {
            return Ok(None);
        };
        changes.apply_to(&mut stored.student, updated_at);
        Ok(Some(stored.student.clone()))
    }
}

#[async_trait]
impl ServiceRequestRepository for InMemoryPortalStore {
    async fn create(
        &self,
        request: &NewServiceRequest,
    ) -> Result<ServiceRequest, ServiceRequestRepositoryError> {
        let mut state = self.requests()?;
        if state.student(request.student_id).is_none() {
            return Err(ServiceRequestRepositoryError::student_missing(
                request.student_id,
            ));
        }

        state.next_request_id += 1;
        let stored = StoredRequest {
            id: RequestId::new(state.next_request_id),
            student_id: request.student_id,
            status: RequestStatus::Pending,
            payload: request.payload.clone(),
            created_at: request.submitted_at,
            updated_at: request.submitted_at,
        };
        state.append_entry(
            request.kind(),
            stored.id,
            RequestStatus::Pending,
            None,
            Some(request.notes.clone()),
            request.submitted_at,
        );
        let snapshot = state.snapshot(&stored);
        state.requests.push(stored);
        Ok(snapshot)
    }

    async fn find(
        &self,
        kind: ServiceKind,
        id: RequestId,
    ) -> Result<Option<ServiceRequest>, ServiceRequestRepositoryError> {
        let state = self.requests()?;
        Ok(state
            .request_index(kind, id)
            .map(|index| state.snapshot(&state.requests[index])))
    }

    async fn list(
        &self,
        kind: ServiceKind,
        student_id: Option<StudentId>,
    ) -> Result<Vec<ServiceRequest>, ServiceRequestRepositoryError> {
        let state = self.requests()?;
        let mut requests: Vec<ServiceRequest> = state
            .requests
            .iter()
            .filter(|request| request.payload.kind() == kind)
            .filter(|request| student_id.is_none_or(|owner| request.student_id == owner))
            .map(|request| state.snapshot(request))
            .collect();
        newest_first(&mut requests, |request| (request.created_at, request.id.get()));
        Ok(requests)
    }

    async fn apply_status_change(
        &self,
        change: &StatusChange,
    ) -> Result<Option<ServiceRequest>, ServiceRequestRepositoryError> {
        let mut state = self.requests()?;
        let Some(index) = state.request_index(change.kind, change.request_id) else {
            return Ok(None);
        };
        if state.requests[index].status != change.expected {
            return Ok(None);
        }
        state.requests[index].status = change.next;
        state.requests[index].updated_at = change.changed_at;
        state.append_entry(
            change.kind,
            change.request_id,
            change.next,
            change.updated_by.clone(),
            change.notes.clone(),
            change.changed_at,
        );
        Ok(Some(state.snapshot(&state.requests[index])))
    }

    async fn set_outing_flags(
        &self,
        id: RequestId,
        flags: &OutingNotificationFlags,
        changed_at: DateTime<Utc>,
    ) -> Result<Option<ServiceRequest>, ServiceRequestRepositoryError> {
        let mut state = self.requests()?;
        let Some(index) = state.request_index(ServiceKind::Outing, id) else {
            return Ok(None);
        };
        let request = &mut state.requests[index];
        if !flags.apply_to(&mut request.payload) {
            return Ok(None);
        }
        request.updated_at = changed_at;
        Ok(Some(state.snapshot(&state.requests[index])))
    }

    async fn count_by_kind(
        &self,
        filter: &RequestCountFilter,
    ) -> Result<BTreeMap<ServiceKind, u64>, ServiceRequestRepositoryError> {
        let state = self.requests()?;
        let mut counts = BTreeMap::new();
        let matching = state.requests.iter().filter(|request| match *filter {
            RequestCountFilter::InStatus(status) => request.status == status,
            RequestCountFilter::CreatedBetween { from, until } => {
                from <= request.created_at && request.created_at < until
            }
        });
        for request in matching {
            *counts.entry(request.payload.kind()).or_insert(0) += 1;
        }
        Ok(counts)
    }
}

#[async_trait]
impl StatusLedgerRepository for InMemoryPortalStore {
    async fn history(
        &self,
        kind: ServiceKind,
        request_id: RequestId,
    ) -> Result<Vec<StatusLedgerEntry>, StatusLedgerError> {
        let state = self.lock_for(StatusLedgerError::query)?;
        let mut entries: Vec<StatusLedgerEntry> = state
            .ledger
            .iter()
            .filter(|entry| entry.kind == kind && entry.request_id == request_id)
            .cloned()
            .collect();
        newest_first(&mut entries, |entry| (entry.created_at, entry.id));
        Ok(entries)
    }
}
