use std::sync::Arc;

use async_trait::async_trait;
use bson::oid::ObjectId;
use tracing::{error, info, instrument};

use crate::dto::request_dto::{QuoteExport, QuoteTask, RequestStatusView, SubmitForm};
use crate::model::request::ClientRequest;
use crate::model::status::{RequestKind, RequestStatus};
use crate::repository::request_repo::RequestRepository;
use crate::service::notifier::RequestNotifier;
use crate::util::error::ServiceError;
use crate::util::tracking::generate_tracking_id;

/// Unit price applied to each treatment line when synthesizing the
/// quoting payload.
pub const DEFAULT_UNIT_PRICE: f64 = 45.0;

/// Outcome of an admin status update. A refusal deletes the row, so
/// there is no updated request to return.
#[derive(Debug, Clone)]
pub enum StatusUpdateOutcome {
    Updated(ClientRequest),
    Refused { tracking_id: String },
}

#[async_trait]
pub trait RequestService: Send + Sync {
    async fn submit_request(&self, form: SubmitForm) -> Result<ClientRequest, ServiceError>;
    async fn get_status(&self, tracking_id: &str) -> Result<RequestStatusView, ServiceError>;
    async fn list_requests(&self) -> Result<Vec<ClientRequest>, ServiceError>;
    async fn update_status(
        &self,
        id: ObjectId,
        new_status: RequestStatus,
        bluefiles_link: Option<String>,
    ) -> Result<StatusUpdateOutcome, ServiceError>;
    async fn export_quote(&self, id: ObjectId) -> Result<QuoteExport, ServiceError>;
}

pub struct RequestServiceImpl {
    pub repo: Arc<dyn RequestRepository>,
    /// Absent when the SMTP configuration is missing; submission then
    /// fails fast with a configuration error.
    pub notifier: Option<Arc<RequestNotifier>>,
}

impl RequestServiceImpl {
    pub fn new(repo: Arc<dyn RequestRepository>, notifier: Option<Arc<RequestNotifier>>) -> Self {
        RequestServiceImpl { repo, notifier }
    }

    fn require_notifier(&self) -> Result<&RequestNotifier, ServiceError> {
        self.notifier.as_deref().ok_or_else(|| {
            error!("Email service is not configured");
            ServiceError::NotConfigured("email service is not configured".to_string())
        })
    }
}

#[async_trait]
impl RequestService for RequestServiceImpl {
    #[instrument(skip(self, form), fields(email = %form.email))]
    async fn submit_request(&self, form: SubmitForm) -> Result<ClientRequest, ServiceError> {
        // No partial submission when email cannot be sent at all.
        let notifier = self.require_notifier()?;

        let tracking_id = generate_tracking_id();
        info!(tracking_id = %tracking_id, "Registering new client request");

        let request = ClientRequest {
            id: None,
            tracking_id: tracking_id.clone(),
            nom_client: form.laboratory.clone(),
            representant: form.full_name.clone(),
            email_client: form.email.clone(),
            fonction: form.fonction.clone(),
            adresse: form.adresse.clone(),
            message: form.message.clone(),
            type_demande: RequestKind::from_subject(form.subject_or_default()),
            is_urgent: form.is_urgent(),
            treatment_details: None,
            statut: RequestStatus::Received,
            date_creation: None,
        };

        // Insert failure aborts the submission before any email goes out.
        let inserted = self.repo.create(request).await.map_err(|e| {
            error!("Failed to persist client request: {}", e);
            ServiceError::from(e)
        })?;

        // Best-effort pair: both dispatched, both awaited, neither fatal.
        notifier.notify_submission(&form, &inserted.tracking_id).await;

        info!(tracking_id = %inserted.tracking_id, "Client request registered");
        Ok(inserted)
    }

    #[instrument(skip(self), fields(tracking_id = %tracking_id))]
    async fn get_status(&self, tracking_id: &str) -> Result<RequestStatusView, ServiceError> {
        let res = self.repo.find_status_by_tracking_id(tracking_id).await;
        res.map_err(ServiceError::from)
    }

    #[instrument(skip(self))]
    async fn list_requests(&self) -> Result<Vec<ClientRequest>, ServiceError> {
        let res = self.repo.list_all().await;
        match &res {
            Ok(requests) => info!("Fetched {} client requests", requests.len()),
            Err(e) => error!("Failed to list client requests: {e}"),
        }
        res.map_err(ServiceError::from)
    }

    #[instrument(skip(self), fields(id = %id, new_status = %new_status))]
    async fn update_status(
        &self,
        id: ObjectId,
        new_status: RequestStatus,
        bluefiles_link: Option<String>,
    ) -> Result<StatusUpdateOutcome, ServiceError> {
        let current = self.repo.get_by_id(id).await.map_err(ServiceError::from)?;

        if !current.statut.can_transition_to(new_status) {
            info!(
                "Rejected status transition {} -> {} for {}",
                current.statut, new_status, current.tracking_id
            );
            return Err(ServiceError::IllegalTransition(format!(
                "Transition {} -> {} non autorisée",
                current.statut, new_status
            )));
        }

        match new_status {
            RequestStatus::Refused => {
                // Admin-workflow emails are load-bearing: any failure
                // here is fatal to the request, unlike the submission
                // pair.
                let notifier = self.require_notifier()?;
                // Email precedes deletion so a failed send leaves the
                // row intact and the refusal retryable.
                notifier.send_refusal(&current).await.map_err(|e| {
                    error!("Refusal email failed: {}", e);
                    ServiceError::InternalError(format!("Refusal email failed: {}", e))
                })?;
                self.repo.delete(id).await.map_err(ServiceError::from)?;
                info!(tracking_id = %current.tracking_id, "Request refused and deleted");
                Ok(StatusUpdateOutcome::Refused {
                    tracking_id: current.tracking_id,
                })
            }
            RequestStatus::Accepted => {
                let notifier = self.require_notifier()?;
                let updated = self
                    .repo
                    .update_status(id, new_status)
                    .await
                    .map_err(ServiceError::from)?;
                notifier
                    .send_acceptance(&updated, bluefiles_link.as_deref())
                    .await
                    .map_err(|e| {
                        error!("Acceptance email failed: {}", e);
                        ServiceError::InternalError(format!("Acceptance email failed: {}", e))
                    })?;
                Ok(StatusUpdateOutcome::Updated(updated))
            }
            RequestStatus::Completed => {
                let notifier = self.require_notifier()?;
                let updated = self
                    .repo
                    .update_status(id, new_status)
                    .await
                    .map_err(ServiceError::from)?;
                notifier.send_completion(&updated).await.map_err(|e| {
                    error!("Completion email failed: {}", e);
                    ServiceError::InternalError(format!("Completion email failed: {}", e))
                })?;
                Ok(StatusUpdateOutcome::Updated(updated))
            }
            _ => {
                // Plain transition, no side effect.
                let updated = self
                    .repo
                    .update_status(id, new_status)
                    .await
                    .map_err(ServiceError::from)?;
                Ok(StatusUpdateOutcome::Updated(updated))
            }
        }
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn export_quote(&self, id: ObjectId) -> Result<QuoteExport, ServiceError> {
        let request = self.repo.get_by_id(id).await.map_err(ServiceError::from)?;

        let taches = request
            .treatment_details
            .as_deref()
            .unwrap_or(&[])
            .iter()
            .map(|line| QuoteTask {
                designation: line.kind.clone(),
                quantite: line.count,
                prix_unitaire: DEFAULT_UNIT_PRICE,
                total: f64::from(line.count) * DEFAULT_UNIT_PRICE,
            })
            .collect();

        Ok(QuoteExport {
            tracking_id: request.tracking_id,
            nom_client: request.nom_client,
            representant: request.representant,
            email_client: request.email_client,
            priorite: if request.is_urgent {
                "haute".to_string()
            } else {
                "normale".to_string()
            },
            taches,
        })
    }
}
