//! End-to-end flows over the public services and the in-memory store.
//!
//! Exercises registration, login, submission, status transitions, the
//! ledger, the dashboard and background notices without a database.

use std::sync::Arc;

use async_trait::async_trait;
use campus_portal::domain::ports::{
    DashboardQuery, LoginService, NotificationGateway, NotificationGatewayError,
    ServiceRequestCommand, ServiceRequestQuery, StatusUpdate, StudentCommand,
};
use campus_portal::domain::{
    DashboardService, ErrorCode, IdentityService, LoginCredentials, NotificationDispatcher,
    NotificationMessage, NotificationReceipt, RequestDraft, RequestId, RequestStatus,
    ServiceContacts, ServiceKind, ServiceRequestService, StudentDraft, StudentRegistration,
};
use campus_portal::outbound::memory::InMemoryPortalStore;
use campus_portal::outbound::security::Argon2PasswordHasher;
use mockable::DefaultClock;
use rstest::{fixture, rstest};
use serde_json::json;
use tokio::sync::mpsc;
use tokio::time::{Duration, timeout};
use zeroize::Zeroizing;

struct RecordingGateway {
    sent: mpsc::UnboundedSender<NotificationMessage>,
}

#[async_trait]
impl NotificationGateway for RecordingGateway {
    async fn send(
        &self,
        message: &NotificationMessage,
    ) -> Result<NotificationReceipt, NotificationGatewayError> {
        let _ = self.sent.send(message.clone());
        Ok(NotificationReceipt::logged_locally())
    }
}

type Requests = ServiceRequestService<InMemoryPortalStore, InMemoryPortalStore, InMemoryPortalStore>;

struct Portal {
    identity: IdentityService<InMemoryPortalStore, Argon2PasswordHasher>,
    requests: Requests,
    dashboard: DashboardService<InMemoryPortalStore, InMemoryPortalStore>,
    notices: mpsc::UnboundedReceiver<NotificationMessage>,
}

#[fixture]
fn portal() -> Portal {
    let store = Arc::new(InMemoryPortalStore::new());
    let hasher = Arc::new(Argon2PasswordHasher::new().expect("hasher"));
    let (sent, notices) = mpsc::unbounded_channel();
    let contacts = ServiceContacts::default().with_contact(ServiceKind::Xerox, "9000000001");
    let dispatcher = NotificationDispatcher::new(Arc::new(RecordingGateway { sent }), contacts);
    Portal {
        identity: IdentityService::new(store.clone(), hasher, Arc::new(DefaultClock)),
        requests: ServiceRequestService::new(
            store.clone(),
            store.clone(),
            store.clone(),
            dispatcher,
            Arc::new(DefaultClock),
        ),
        dashboard: DashboardService::new(store.clone(), store, Arc::new(DefaultClock)),
        notices,
    }
}

fn registration(roll: &str, email: &str, phone: &str) -> StudentRegistration {
    StudentRegistration::try_from_draft(StudentDraft {
        student_id: Some(roll.to_owned()),
        name: Some("Asha Rao".to_owned()),
        email: Some(email.to_owned()),
        phone: Some(phone.to_owned()),
        password: Some(Zeroizing::new("hunter2".to_owned())),
        emergency_contact: Some("8888888888".to_owned()),
        hostel_room: Some("A-101".to_owned()),
        blood_group: Some("O+".to_owned()),
    })
    .expect("valid registration")
}

fn xerox_draft() -> RequestDraft {
    RequestDraft::from_value(json!({
        "service_type": "b&w",
        "pages": 10,
        "delivery_location": "hostel-A",
        "contact_number": "9999999999"
    }))
}

fn status(value: &str, by: Option<&str>) -> StatusUpdate {
    StatusUpdate {
        status: value.to_owned(),
        updated_by: by.map(str::to_owned),
        notes: None,
    }
}

#[rstest]
#[tokio::test]
async fn xerox_order_runs_to_completion(portal: Portal) {
    let Portal {
        identity,
        requests,
        dashboard,
        mut notices,
    } = portal;
    let student = identity
        .register(registration("21CS001", "asha@example.edu", "9999999999"))
        .await
        .expect("registered");
    let credentials = LoginCredentials::try_from_parts("21CS001", "hunter2").expect("credentials");
    let signed_in = identity.authenticate(&credentials).await.expect("login");
    assert_eq!(signed_in.id, student.id);

    let created = requests
        .create_request(ServiceKind::Xerox, student.id, &xerox_draft())
        .await
        .expect("created");
    assert_eq!(created.status, RequestStatus::Pending);

    let notice = timeout(Duration::from_secs(5), notices.recv())
        .await
        .expect("notice in time")
        .expect("notice sent");
    assert_eq!(notice.phone(), "9000000001");
    assert_eq!(notice.service_tag(), "xerox");

    let snapshot = dashboard.snapshot().await.expect("snapshot");
    assert_eq!(snapshot.total_students, 1);
    let tally = snapshot.tally(ServiceKind::Xerox).expect("xerox tally");
    assert_eq!((tally.pending, tally.created_today), (1, 1));

    let completed = requests
        .update_status(ServiceKind::Xerox, created.id, &status("completed", Some("staff1")))
        .await
        .expect("skipping stages forward is allowed");
    assert_eq!(completed.status, RequestStatus::Completed);

    let history = requests
        .status_history(ServiceKind::Xerox, created.id)
        .await
        .expect("history");
    let statuses: Vec<_> = history.iter().map(|entry| entry.status).collect();
    assert_eq!(statuses, vec![RequestStatus::Completed, RequestStatus::Pending]);
    assert_eq!(history[0].updated_by.as_deref(), Some("staff1"));

    let after = dashboard.snapshot().await.expect("snapshot");
    assert_eq!(after.tally(ServiceKind::Xerox).expect("tally").pending, 0);
}

#[rstest]
#[tokio::test]
async fn terminal_status_cannot_be_left(portal: Portal) {
    let student = portal
        .identity
        .register(registration("21CS002", "ravi@example.edu", "9999999998"))
        .await
        .expect("registered");
    let created = portal
        .requests
        .create_request(ServiceKind::Xerox, student.id, &xerox_draft())
        .await
        .expect("created");
    portal
        .requests
        .update_status(ServiceKind::Xerox, created.id, &status("completed", None))
        .await
        .expect("completed");

    let err = portal
        .requests
        .update_status(ServiceKind::Xerox, created.id, &status("processing", None))
        .await
        .expect_err("completed is terminal");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(err.field(), Some("status"));

    let history = portal
        .requests
        .status_history(ServiceKind::Xerox, created.id)
        .await
        .expect("history");
    assert_eq!(history.len(), 2);
}

#[rstest]
#[tokio::test]
async fn duplicate_registration_reports_the_field(portal: Portal) {
    portal
        .identity
        .register(registration("21CS001", "asha@example.edu", "9999999999"))
        .await
        .expect("first registration");

    let err = portal
        .identity
        .register(registration("21CS009", "ASHA@example.edu", "9999999990"))
        .await
        .expect_err("email taken");
    assert_eq!(err.code(), ErrorCode::Conflict);
    assert_eq!(err.field(), Some("email"));
}

#[rstest]
#[tokio::test]
async fn requests_are_scoped_to_their_variant(portal: Portal) {
    let student = portal
        .identity
        .register(registration("21CS003", "mina@example.edu", "9999999997"))
        .await
        .expect("registered");
    let created = portal
        .requests
        .create_request(ServiceKind::Xerox, student.id, &xerox_draft())
        .await
        .expect("created");

    let err = portal
        .requests
        .get_request(ServiceKind::Stationary, created.id)
        .await
        .expect_err("other variant");
    assert_eq!(err.code(), ErrorCode::NotFound);

    let mine = portal
        .requests
        .list_requests(ServiceKind::Xerox, Some(student.id))
        .await
        .expect("list");
    assert_eq!(mine.len(), 1);
    let mess = portal
        .requests
        .list_requests(ServiceKind::Mess, None)
        .await
        .expect("list");
    assert!(mess.is_empty());
}

async fn registered_xerox_order(portal: &Portal, roll: &str, phone: &str) -> RequestId {
    let student = portal
        .identity
        .register(registration(roll, &format!("{roll}@example.edu"), phone))
        .await
        .expect("registered");
    portal
        .requests
        .create_request(ServiceKind::Xerox, student.id, &xerox_draft())
        .await
        .expect("created")
        .id
}

#[rstest]
#[tokio::test]
async fn simultaneous_updates_both_reach_the_ledger(portal: Portal) {
    let id = registered_xerox_order(&portal, "21CS004", "9999999996").await;

    let processing = status("processing", Some("desk"));
    let ready = status("ready", Some("printer"));
    let (first, second) = tokio::join!(
        portal.requests.update_status(ServiceKind::Xerox, id, &processing),
        portal.requests.update_status(ServiceKind::Xerox, id, &ready),
    );
    first.expect("processing applied");
    second.expect("ready applied");

    let history = portal
        .requests
        .status_history(ServiceKind::Xerox, id)
        .await
        .expect("history");
    assert_eq!(history.len(), 3);
    let record = portal
        .requests
        .get_request(ServiceKind::Xerox, id)
        .await
        .expect("record");
    assert_eq!(record.status, history[0].status);
    assert_eq!(record.status, RequestStatus::Ready);
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_updates_never_lose_an_accepted_entry(portal: Portal) {
    let id = registered_xerox_order(&portal, "21CS005", "9999999995").await;
    let requests = Arc::new(portal.requests);

    let tasks: Vec<_> = ["processing", "ready", "completed"]
        .into_iter()
        .map(|next| {
            let requests = Arc::clone(&requests);
            tokio::spawn(async move {
                requests
                    .update_status(ServiceKind::Xerox, id, &status(next, None))
                    .await
            })
        })
        .collect();

    let mut accepted = 0;
    for task in tasks {
        match task.await.expect("task joins") {
            Ok(_) => accepted += 1,
            Err(err) => assert_eq!(err.field(), Some("status")),
        }
    }
    assert!(accepted >= 1);

    let history = requests
        .status_history(ServiceKind::Xerox, id)
        .await
        .expect("history");
    assert_eq!(history.len(), accepted + 1);
    let record = requests
        .get_request(ServiceKind::Xerox, id)
        .await
        .expect("record");
    assert_eq!(record.status, history[0].status);
}
