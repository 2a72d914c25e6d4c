use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::model::status::{RequestKind, RequestStatus};

/// One client submission in the `demandes_clients` collection, plus its
/// lifecycle status and metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientRequest {
    #[serde(rename = "_id")]
    pub id: Option<ObjectId>,
    /// Public-safe opaque identifier (`ANA-` + 8 uppercase hex chars),
    /// assigned once at creation and never regenerated.
    pub tracking_id: String,
    /// Organization name (form "laboratory" field).
    pub nom_client: Option<String>,
    /// Contact person's name (form "full-name" field).
    pub representant: String,
    pub email_client: String,
    pub fonction: Option<String>,
    pub adresse: Option<String>,
    pub message: String,
    pub type_demande: RequestKind,
    pub is_urgent: bool,
    /// Ordered treatment lines consumed by the quoting export.
    pub treatment_details: Option<Vec<TreatmentLine>>,
    pub statut: RequestStatus,
    /// RFC 3339, store-assigned at insert; admin listing sorts on it
    /// descending.
    pub date_creation: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreatmentLine {
    #[serde(rename = "type")]
    pub kind: String,
    pub count: u32,
}
