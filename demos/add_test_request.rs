use anabyo_backend::config::MongoConfig;
use anabyo_backend::model::request::{ClientRequest, TreatmentLine};
use anabyo_backend::model::status::{RequestKind, RequestStatus};
use anabyo_backend::repository::request_repo::{MongoRequestRepository, RequestRepository};
use anabyo_backend::util::tracking::generate_tracking_id;
use dotenv::dotenv;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Inserts a fake request, treatment details included, so the admin
/// page and the quoting export have something to show during
/// development.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let _ = dotenv();

    info!("Connecting to MongoDB...");
    let config = MongoConfig::from_env()?;
    let repo = MongoRequestRepository::new(&config).await?;

    let tracking_id = generate_tracking_id();
    info!("Inserting test request with tracking id {}", tracking_id);

    let request = ClientRequest {
        id: None,
        tracking_id,
        nom_client: Some("Institut Radium".to_string()),
        representant: "Dr. Marie Curie".to_string(),
        email_client: "marie.curie@institut-radium.fr".to_string(),
        fonction: Some("Directrice de laboratoire".to_string()),
        adresse: Some("1 rue Pierre et Marie Curie, Paris".to_string()),
        message: "Ceci est une demande de test générée par un script.".to_string(),
        type_demande: RequestKind::FreeTrial,
        is_urgent: false,
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

    match repo.create(request).await {
        Ok(inserted) => {
            info!("✅ Test request added: {}", inserted.tracking_id);
            Ok(())
        }
        Err(e) => {
            error!("Failed to insert test request: {}", e);
            Err(Box::<dyn std::error::Error>::from(e))
        }
    }
}
