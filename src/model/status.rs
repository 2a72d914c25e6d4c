use serde::{Deserialize, Serialize};

/// Lifecycle status of a client request.
///
/// The wire and storage representation keeps the French labels the
/// front-end pages and the `demandes_clients` collection use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestStatus {
    #[serde(rename = "Reçue")]
    Received,
    #[serde(rename = "En cours")]
    InProgress,
    #[serde(rename = "Acceptée")]
    Accepted,
    #[serde(rename = "Refusée")]
    Refused,
    #[serde(rename = "Terminée")]
    Completed,
}

impl RequestStatus {
    /// Parse a status label as sent by the admin page. Returns `None`
    /// for anything outside the closed set (including the legacy
    /// `"json"` sentinel, which is an export operation, not a status).
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "Reçue" => Some(RequestStatus::Received),
            "En cours" => Some(RequestStatus::InProgress),
            "Acceptée" => Some(RequestStatus::Accepted),
            "Refusée" => Some(RequestStatus::Refused),
            "Terminée" => Some(RequestStatus::Completed),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Received => "Reçue",
            RequestStatus::InProgress => "En cours",
            RequestStatus::Accepted => "Acceptée",
            RequestStatus::Refused => "Refusée",
            RequestStatus::Completed => "Terminée",
        }
    }

    /// Closed transition table. `Refusée` and `Terminée` are terminal;
    /// a refused request is deleted rather than kept.
    pub fn can_transition_to(self, next: RequestStatus) -> bool {
        use RequestStatus::*;
        matches!(
            (self, next),
            (Received, InProgress)
                | (Received, Accepted)
                | (Received, Refused)
                | (InProgress, Accepted)
                | (InProgress, Refused)
                | (Accepted, Refused)
                | (Accepted, Completed)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, RequestStatus::Refused | RequestStatus::Completed)
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Classification of a submission, derived from its subject line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestKind {
    #[serde(rename = "Essai gratuit")]
    FreeTrial,
    #[serde(rename = "Devis")]
    Quote,
}

impl RequestKind {
    /// A subject mentioning "essai" is a free-trial request, anything
    /// else is a quote.
    pub fn from_subject(subject: &str) -> Self {
        if subject.to_lowercase().contains("essai") {
            RequestKind::FreeTrial
        } else {
            RequestKind::Quote
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RequestKind::FreeTrial => "Essai gratuit",
            RequestKind::Quote => "Devis",
        }
    }
}

impl std::fmt::Display for RequestKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
