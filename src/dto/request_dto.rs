use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::model::status::RequestStatus;

/// URL-encoded submission body, field names as the public form posts
/// them.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SubmitForm {
    #[serde(rename = "full-name")]
    #[validate(length(min = 2, max = 100))]
    pub full_name: String,

    #[validate(email)]
    pub email: String,

    #[validate(length(min = 1, max = 5000))]
    pub message: String,

    pub laboratory: Option<String>,

    pub subject: Option<String>,

    /// Checkbox value, e.g. "Oui (+50%)".
    #[serde(rename = "Traitement Urgent")]
    pub traitement_urgent: Option<String>,

    pub fonction: Option<String>,

    pub adresse: Option<String>,
}

impl SubmitForm {
    /// Subject line, falling back to the default used by the site.
    pub fn subject_or_default(&self) -> &str {
        match self.subject.as_deref() {
            Some(s) if !s.is_empty() => s,
            _ => "Nouvelle demande depuis le site",
        }
    }

    /// The urgency checkbox posts values like "Oui (+50%)".
    pub fn is_urgent(&self) -> bool {
        self.traitement_urgent
            .as_deref()
            .map(|v| v.starts_with("Oui"))
            .unwrap_or(false)
    }
}

/// Admin status-update body. Fields are optional so their absence maps
/// to a 400 rather than a body-rejection.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStatusRequest {
    pub id: Option<String>,
    #[serde(rename = "newStatus")]
    pub new_status: Option<String>,
    #[serde(rename = "bluefilesLink")]
    pub bluefiles_link: Option<String>,
}

/// Public status lookup response: exactly the non-sensitive subset,
/// nothing else.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestStatusView {
    pub nom_client: Option<String>,
    pub statut: RequestStatus,
    pub date_creation: Option<String>,
}

/// Payload handed to the external quoting step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteExport {
    pub tracking_id: String,
    pub nom_client: Option<String>,
    pub representant: String,
    pub email_client: String,
    /// "haute" when the request was flagged urgent, "normale" otherwise.
    pub priorite: String,
    pub taches: Vec<QuoteTask>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteTask {
    pub designation: String,
    pub quantite: u32,
    pub prix_unitaire: f64,
    pub total: f64,
}

/// Body returned after a refusal: the row is gone, only a confirmation
/// message remains.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefusalResponse {
    pub message: String,
    pub tracking_id: String,
}
