use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use bson::oid::ObjectId;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};
use validator::Validate;

use crate::dto::request_dto::{RefusalResponse, SubmitForm, UpdateStatusRequest};
use crate::model::status::RequestStatus;
use crate::service::request_service::{RequestService, RequestServiceImpl, StatusUpdateOutcome};
use crate::util::error::HandlerError;

/// Handler: public form submission.
///
/// The body is URL-encoded form data straight from the site, decoded
/// by hand so a malformed or incomplete body is a 400 rather than an
/// extractor rejection. On success the browser is redirected to the
/// static thank-you page.
pub async fn submit_request_handler(
    State(service): State<Arc<RequestServiceImpl>>,
    body: String,
) -> Result<impl IntoResponse, HandlerError> {
    let form: SubmitForm = serde_urlencoded::from_str(&body).map_err(|e| {
        warn!("Rejected submission body: {}", e);
        HandlerError::bad_request(format!("Formulaire invalide: {}", e))
    })?;

    form.validate()
        .map_err(|e| HandlerError::bad_request(format!("Formulaire invalide: {}", e)))?;

    let request = service.submit_request(form).await?;
    info!(tracking_id = %request.tracking_id, "Submission accepted, redirecting");

    Ok((
        StatusCode::FOUND,
        [(header::LOCATION, "/remerciement.html")],
    ))
}

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    pub id: Option<String>,
}

/// Handler: public status lookup by tracking id.
pub async fn get_status_handler(
    State(service): State<Arc<RequestServiceImpl>>,
    Query(params): Query<StatusQuery>,
) -> Result<impl IntoResponse, HandlerError> {
    let tracking_id = params
        .id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| HandlerError::bad_request("Un identifiant de suivi est requis."))?;

    let view = service.get_status(&tracking_id).await?;
    Ok(Json(view))
}

/// Handler: list all requests, newest first (admin only).
pub async fn list_requests_handler(
    State(service): State<Arc<RequestServiceImpl>>,
) -> Result<impl IntoResponse, HandlerError> {
    let requests = service.list_requests().await?;
    Ok(Json(requests))
}

/// Handler: status transition (admin only).
///
/// Side effects depend on the target status: acceptance and completion
/// email the client, refusal emails then deletes the row. The response
/// is the updated row, or a confirmation message for refusals.
pub async fn update_request_handler(
    State(service): State<Arc<RequestServiceImpl>>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = payload
        .id
        .as_deref()
        .ok_or_else(|| HandlerError::bad_request("ID de la demande manquant."))?;
    let new_status = payload
        .new_status
        .as_deref()
        .ok_or_else(|| HandlerError::bad_request("Nouveau statut manquant."))?;

    let id = ObjectId::parse_str(id)
        .map_err(|_| HandlerError::bad_request("ID de la demande invalide."))?;
    let new_status = RequestStatus::parse(new_status)
        .ok_or_else(|| HandlerError::bad_request(format!("Statut inconnu: {}", new_status)))?;

    let outcome = service
        .update_status(id, new_status, payload.bluefiles_link)
        .await?;

    match outcome {
        StatusUpdateOutcome::Updated(request) => Ok(Json(request).into_response()),
        StatusUpdateOutcome::Refused { tracking_id } => Ok(Json(RefusalResponse {
            message: "Demande refusée et supprimée.".to_string(),
            tracking_id,
        })
        .into_response()),
    }
}

/// Handler: quoting export (admin only, read-only).
pub async fn export_quote_handler(
    State(service): State<Arc<RequestServiceImpl>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = ObjectId::parse_str(&id)
        .map_err(|_| HandlerError::bad_request("ID de la demande invalide."))?;
    let export = service.export_quote(id).await?;
    Ok(Json(export))
}
