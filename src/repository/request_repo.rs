use crate::config::mongo_conf::MongoConfig;
use crate::dto::request_dto::RequestStatusView;
use crate::model::request::ClientRequest;
use crate::model::status::RequestStatus;
use crate::repository::repository_error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use bson::{doc, oid::ObjectId};
use futures::stream::StreamExt;
use mongodb::options::{FindOneOptions, FindOptions};
use tracing::{error, info};

#[async_trait]
pub trait RequestRepository: Send + Sync {
    /// Insert a new request; the store assigns id, default status and
    /// creation date.
    async fn create(&self, request: ClientRequest) -> RepositoryResult<ClientRequest>;
    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<ClientRequest>;
    /// Public lookup by tracking id, restricted to the non-sensitive
    /// field subset.
    async fn find_status_by_tracking_id(
        &self,
        tracking_id: &str,
    ) -> RepositoryResult<RequestStatusView>;
    /// All requests, newest first.
    async fn list_all(&self) -> RepositoryResult<Vec<ClientRequest>>;
    async fn update_status(
        &self,
        id: ObjectId,
        status: RequestStatus,
    ) -> RepositoryResult<ClientRequest>;
    async fn delete(&self, id: ObjectId) -> RepositoryResult<()>;
}

pub struct MongoRequestRepository {
    collection: mongodb::Collection<ClientRequest>,
}

impl MongoRequestRepository {
    /// Create a new MongoRequestRepository using MongoConfig
    pub async fn new(config: &MongoConfig) -> Result<Self, mongodb::error::Error> {
        use mongodb::{
            options::{ClientOptions, Credential, ResolverConfig},
            Client,
        };

        let mut client_options =
            ClientOptions::parse_with_resolver_config(&config.uri, ResolverConfig::cloudflare())
                .await?;
        client_options.app_name = Some("AnabyoBackend".to_string());
        client_options.max_pool_size = Some(config.pool_size);
        client_options.connect_timeout =
            Some(std::time::Duration::from_secs(config.connection_timeout_secs));

        if let (Some(ref username), Some(ref password)) = (&config.username, &config.password) {
            client_options.credential = Some(
                Credential::builder()
                    .username(username.clone())
                    .password(password.clone())
                    .build(),
            );
        }

        let client = Client::with_options(client_options)?;
        let db = client.database(&config.database);
        let collection_name = config.request_collection.as_deref().unwrap_or("demandes_clients");
        let collection = db.collection::<ClientRequest>(collection_name);
        Ok(MongoRequestRepository { collection })
    }
}

#[async_trait]
impl RequestRepository for MongoRequestRepository {
    #[tracing::instrument(skip(self, request), fields(tracking_id = %request.tracking_id))]
    async fn create(&self, request: ClientRequest) -> RepositoryResult<ClientRequest> {
        info!(tracking_id = %request.tracking_id, "Creating new client request");
        let mut new_request = request;
        new_request.id = Some(ObjectId::new());
        new_request.statut = RequestStatus::Received;
        new_request.date_creation = Some(chrono::Utc::now().to_rfc3339());

        let result = self.collection.insert_one(new_request.clone(), None).await;
        match result {
            Ok(_) => {
                info!("Client request created successfully");
                Ok(new_request)
            }
            Err(e) => {
                error!("Failed to create client request: {}", e);
                Err(RepositoryError::from(e))
            }
        }
    }

    #[tracing::instrument(skip(self), fields(id = %id))]
    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<ClientRequest> {
        let filter = doc! { "_id": id };
        let result = self.collection.find_one(filter, None).await;
        match result {
            Ok(Some(request)) => Ok(request),
            Ok(None) => {
                error!("Client request not found for ID: {}", id);
                Err(RepositoryError::not_found(format!(
                    "Client request not found for ID: {}",
                    id
                )))
            }
            Err(e) => {
                error!("Failed to fetch client request by ID: {}", e);
                Err(RepositoryError::database(format!(
                    "Failed to fetch client request by ID: {}",
                    e
                )))
            }
        }
    }

    #[tracing::instrument(skip(self), fields(tracking_id = %tracking_id))]
    async fn find_status_by_tracking_id(
        &self,
        tracking_id: &str,
    ) -> RepositoryResult<RequestStatusView> {
        let filter = doc! { "tracking_id": tracking_id };
        let options = FindOneOptions::builder()
            .projection(doc! { "nom_client": 1, "statut": 1, "date_creation": 1, "_id": 0 })
            .build();
        let result = self
            .collection
            .clone_with_type::<RequestStatusView>()
            .find_one(filter, options)
            .await;
        match result {
            Ok(Some(view)) => Ok(view),
            Ok(None) => {
                info!("No request found for tracking id: {}", tracking_id);
                Err(RepositoryError::not_found(format!(
                    "No request found for tracking id: {}",
                    tracking_id
                )))
            }
            Err(e) => {
                error!("Failed to fetch request status: {}", e);
                Err(RepositoryError::database(format!(
                    "Failed to fetch request status: {}",
                    e
                )))
            }
        }
    }

    #[tracing::instrument(skip(self))]
    async fn list_all(&self) -> RepositoryResult<Vec<ClientRequest>> {
        let options = FindOptions::builder()
            .sort(doc! { "date_creation": -1 })
            .build();
        let cursor = self.collection.find(None, options).await;
        match cursor {
            Ok(mut cursor) => {
                let mut requests = Vec::new();
                while let Some(request) = cursor.next().await {
                    match request {
                        Ok(r) => requests.push(r),
                        Err(e) => {
                            error!("Failed to deserialize client request: {}", e);
                            return Err(RepositoryError::serialization(format!(
                                "Failed to deserialize client request: {}",
                                e
                            )));
                        }
                    }
                }
                info!("Fetched {} client requests", requests.len());
                Ok(requests)
            }
            Err(e) => {
                error!("Failed to list client requests: {}", e);
                Err(RepositoryError::database(format!(
                    "Failed to list client requests: {}",
                    e
                )))
            }
        }
    }

    #[tracing::instrument(skip(self), fields(id = %id, status = %status))]
    async fn update_status(
        &self,
        id: ObjectId,
        status: RequestStatus,
    ) -> RepositoryResult<ClientRequest> {
        info!(request_id = %id, status = %status, "Updating request status");
        let filter = doc! { "_id": id };
        let update = doc! { "$set": { "statut": status.as_str() } };
        let result = self.collection.update_one(filter, update, None).await;
        match result {
            Ok(update_result) if update_result.matched_count > 0 => {
                let mut updated = self.get_by_id(id).await?;
                updated.statut = status;
                Ok(updated)
            }
            Ok(_) => {
                error!("No request found to update status for ID: {}", id);
                Err(RepositoryError::not_found(format!(
                    "No request found to update status for ID: {}",
                    id
                )))
            }
            Err(e) => {
                error!("Failed to update request status: {}", e);
                Err(RepositoryError::database(format!(
                    "Failed to update request status: {}",
                    e
                )))
            }
        }
    }

    #[tracing::instrument(skip(self), fields(id = %id))]
    async fn delete(&self, id: ObjectId) -> RepositoryResult<()> {
        info!("Deleting client request with ID: {}", id);
        let filter = doc! { "_id": id };
        let result = self.collection.delete_one(filter, None).await;
        match result {
            Ok(delete_result) if delete_result.deleted_count > 0 => {
                info!("Client request deleted for ID: {}", id);
                Ok(())
            }
            Ok(_) => {
                error!("No request found to delete for ID: {}", id);
                Err(RepositoryError::not_found(format!(
                    "No request found to delete for ID: {}",
                    id
                )))
            }
            Err(e) => {
                error!("Failed to delete client request: {}", e);
                Err(RepositoryError::database(format!(
                    "Failed to delete client request: {}",
                    e
                )))
            }
        }
    }
}
