#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use bson::oid::ObjectId;

use anabyo_backend::dto::request_dto::RequestStatusView;
use anabyo_backend::middlewares::admin_middleware::AdminAuthState;
use anabyo_backend::model::request::{ClientRequest, TreatmentLine};
use anabyo_backend::model::status::{RequestKind, RequestStatus};
use anabyo_backend::repository::repository_error::{RepositoryError, RepositoryResult};
use anabyo_backend::repository::request_repo::RequestRepository;
use anabyo_backend::router::request_router::request_router;
use anabyo_backend::service::notifier::RequestNotifier;
use anabyo_backend::service::request_service::RequestServiceImpl;
use anabyo_backend::util::email::{EmailError, EmailMessage, Mailer};

pub const ADMIN_PASSWORD: &str = "test-admin-password";
pub const STAFF_EMAIL: &str = "staff@example.com";
pub const SITE_BASE_URL: &str = "https://anabyo.example";

/// In-memory stand-in for the Mongo repository. Rows are kept in
/// insertion order; the listing mirrors the store's newest-first
/// contract.
#[derive(Default)]
pub struct MockRequestRepository {
    pub rows: Mutex<Vec<ClientRequest>>,
    pub fail_create: Mutex<bool>,
}

impl MockRequestRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn row_count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    pub fn find_by_tracking_id(&self, tracking_id: &str) -> Option<ClientRequest> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.tracking_id == tracking_id)
            .cloned()
    }
}

#[async_trait]
impl RequestRepository for MockRequestRepository {
    async fn create(&self, request: ClientRequest) -> RepositoryResult<ClientRequest> {
        if *self.fail_create.lock().unwrap() {
            return Err(RepositoryError::database("forced insert failure"));
        }
        let mut new_request = request;
        new_request.id = Some(ObjectId::new());
        new_request.statut = RequestStatus::Received;
        new_request.date_creation = Some(chrono::Utc::now().to_rfc3339());
        self.rows.lock().unwrap().push(new_request.clone());
        Ok(new_request)
    }

    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<ClientRequest> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == Some(id))
            .cloned()
            .ok_or_else(|| RepositoryError::not_found(format!("no request for id {}", id)))
    }

    async fn find_status_by_tracking_id(
        &self,
        tracking_id: &str,
    ) -> RepositoryResult<RequestStatusView> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.tracking_id == tracking_id)
            .map(|r| RequestStatusView {
                nom_client: r.nom_client.clone(),
                statut: r.statut,
                date_creation: r.date_creation.clone(),
            })
            .ok_or_else(|| {
                RepositoryError::not_found(format!("no request for tracking id {}", tracking_id))
            })
    }

    async fn list_all(&self) -> RepositoryResult<Vec<ClientRequest>> {
        let mut rows = self.rows.lock().unwrap().clone();
        // ObjectIds are monotonic within a process, which breaks ties
        // between rows created in the same instant.
        rows.sort_by(|a, b| {
            b.date_creation
                .cmp(&a.date_creation)
                .then(b.id.cmp(&a.id))
        });
        Ok(rows)
    }

    async fn update_status(
        &self,
        id: ObjectId,
        status: RequestStatus,
    ) -> RepositoryResult<ClientRequest> {
        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .iter_mut()
            .find(|r| r.id == Some(id))
            .ok_or_else(|| RepositoryError::not_found(format!("no request for id {}", id)))?;
        row.statut = status;
        Ok(row.clone())
    }

    async fn delete(&self, id: ObjectId) -> RepositoryResult<()> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|r| r.id != Some(id));
        if rows.len() == before {
            return Err(RepositoryError::not_found(format!(
                "no request for id {}",
                id
            )));
        }
        Ok(())
    }
}

/// Records every send attempt; recipients in `fail_recipients` get an
/// SMTP error back (the attempt is still recorded).
#[derive(Default)]
pub struct MockMailer {
    pub sent: Mutex<Vec<EmailMessage>>,
    pub fail_recipients: Mutex<HashSet<String>>,
}

impl MockMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_for(&self, recipient: &str) {
        self.fail_recipients
            .lock()
            .unwrap()
            .insert(recipient.to_string());
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn sent_to(&self, recipient: &str) -> Vec<EmailMessage> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.to == recipient)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl Mailer for MockMailer {
    async fn send_email(&self, message: EmailMessage) -> Result<(), EmailError> {
        let to = message.to.clone();
        self.sent.lock().unwrap().push(message);
        if self.fail_recipients.lock().unwrap().contains(&to) {
            return Err(EmailError::SmtpError(format!("forced failure for {}", to)));
        }
        Ok(())
    }
}

pub struct TestApp {
    pub router: Router,
    pub repo: Arc<MockRequestRepository>,
    pub mailer: Arc<MockMailer>,
}

/// Router wired exactly like `App::new`, with in-memory collaborators.
pub fn setup_app() -> TestApp {
    let repo = Arc::new(MockRequestRepository::new());
    let mailer = Arc::new(MockMailer::new());
    let notifier = Arc::new(RequestNotifier::new(
        mailer.clone() as Arc<dyn Mailer>,
        STAFF_EMAIL.to_string(),
        SITE_BASE_URL.to_string(),
    ));
    let service = Arc::new(RequestServiceImpl::new(
        repo.clone() as Arc<dyn RequestRepository>,
        Some(notifier),
    ));
    let admin_auth_state = Arc::new(AdminAuthState {
        admin_password: ADMIN_PASSWORD.to_string(),
    });
    TestApp {
        router: request_router(service, admin_auth_state),
        repo,
        mailer,
    }
}

/// Same wiring but with no email service configured.
pub fn setup_app_without_mailer() -> TestApp {
    let repo = Arc::new(MockRequestRepository::new());
    let mailer = Arc::new(MockMailer::new());
    let service = Arc::new(RequestServiceImpl::new(
        repo.clone() as Arc<dyn RequestRepository>,
        None,
    ));
    let admin_auth_state = Arc::new(AdminAuthState {
        admin_password: ADMIN_PASSWORD.to_string(),
    });
    TestApp {
        router: request_router(service, admin_auth_state),
        repo,
        mailer,
    }
}

/// Insert a row directly through the repository, as the submit flow
/// would, and return it with its assigned id.
pub async fn seed_request(repo: &MockRequestRepository, urgent: bool) -> ClientRequest {
    let request = ClientRequest {
        id: None,
        tracking_id: anabyo_backend::util::tracking::generate_tracking_id(),
        nom_client: Some("BioLab".to_string()),
        representant: "Jane Doe".to_string(),
        email_client: "jane@example.com".to_string(),
        fonction: None,
        adresse: None,
        message: "Need testing".to_string(),
        type_demande: RequestKind::Quote,
        is_urgent: urgent,
        treatment_details: Some(vec![
            TreatmentLine {
                kind: "Analyse microbiologique".to_string(),
                count: 3,
            },
            TreatmentLine {
                kind: "Contrôle qualité eau".to_string(),
                count: 1,
            },
        ]),
        statut: RequestStatus::Received,
        date_creation: None,
    };
    repo.create(request).await.expect("seed insert failed")
}
