//! Firestore REST API client.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use gcp_auth::{CustomServiceAccount, TokenProvider};
use reqwest::{Client, StatusCode};
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::metrics::record_request;
use crate::retry::{with_retry, RetryConfig};
use crate::types::{Document, ListDocumentsResponse, Value};

/// OAuth scope for Firestore/Datastore access.
const FIRESTORE_SCOPE: &str = "https://www.googleapis.com/auth/datastore";

/// Firestore client configuration.
#[derive(Debug, Clone)]
pub struct FirestoreConfig {
    /// GCP project ID
    pub project_id: String,
    /// Database ID (usually "(default)")
    pub database_id: String,
    /// Request timeout
    pub timeout: Duration,
    /// Connect timeout
    pub connect_timeout: Duration,
    /// Retry configuration
    pub retry: RetryConfig,
}

impl FirestoreConfig {
    /// Create config from environment variables.
    pub fn from_env() -> StoreResult<Self> {
        let project_id = std::env::var("GCP_PROJECT_ID")
            .or_else(|_| std::env::var("FIREBASE_PROJECT_ID"))
            .map_err(|_| {
                StoreError::auth_error(
                    "GCP_PROJECT_ID or FIREBASE_PROJECT_ID must be set to access Firestore",
                )
            })?;

        if project_id.is_empty() {
            return Err(StoreError::auth_error(
                "GCP_PROJECT_ID or FIREBASE_PROJECT_ID cannot be empty",
            ));
        }

        Ok(Self {
            project_id,
            database_id: std::env::var("FIRESTORE_DATABASE_ID")
                .unwrap_or_else(|_| "(default)".to_string()),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(5),
            retry: RetryConfig::from_env(),
        })
    }
}

/// Firestore REST API client.
pub struct FirestoreClient {
    http: Client,
    config: FirestoreConfig,
    base_url: String,
    auth: Arc<dyn TokenProvider>,
}

impl Clone for FirestoreClient {
    fn clone(&self) -> Self {
        Self {
            http: self.http.clone(),
            config: self.config.clone(),
            base_url: self.base_url.clone(),
            auth: Arc::clone(&self.auth),
        }
    }
}

impl FirestoreClient {
    /// Create a new Firestore client.
    pub async fn new(config: FirestoreConfig) -> StoreResult<Self> {
        let auth = Self::create_auth_provider()?;

        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .user_agent(concat!("frec-store/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(StoreError::Network)?;

        let base_url = format!(
            "https://firestore.googleapis.com/v1/projects/{}/databases/{}/documents",
            config.project_id, config.database_id
        );

        Ok(Self {
            http,
            config,
            base_url,
            auth,
        })
    }

    /// Create from environment variables.
    pub async fn from_env() -> StoreResult<Self> {
        let config = FirestoreConfig::from_env()?;
        Self::new(config).await
    }

    fn create_auth_provider() -> StoreResult<Arc<dyn TokenProvider>> {
        let service_account = CustomServiceAccount::from_env()
            .map_err(|e| StoreError::auth_error(format!("Failed to load service account: {}", e)))?;

        match service_account {
            Some(sa) => Ok(Arc::new(sa)),
            None => Err(StoreError::auth_error(
                "GOOGLE_APPLICATION_CREDENTIALS not set. \
                 Set it to the path of your service account JSON file.",
            )),
        }
    }

    /// Get an access token. gcp_auth caches and refreshes internally.
    async fn get_token(&self) -> StoreResult<String> {
        let token = self
            .auth
            .token(&[FIRESTORE_SCOPE])
            .await
            .map_err(|e| StoreError::auth_error(format!("Token refresh failed: {}", e)))?;
        Ok(token.as_str().to_string())
    }

    /// Build document path.
    fn document_path(&self, collection: &str, doc_id: &str) -> String {
        format!("{}/{}/{}", self.base_url, collection, doc_id)
    }

    /// Get a document. Returns `None` when it does not exist.
    pub async fn get_document(
        &self,
        collection: &str,
        doc_id: &str,
    ) -> StoreResult<Option<Document>> {
        let url = self.document_path(collection, doc_id);

        let result = with_retry(&self.config.retry, "get_document", || async {
            let token = self.get_token().await?;
            let response = self.http.get(&url).bearer_auth(&token).send().await?;

            match response.status() {
                StatusCode::OK => {
                    let doc: Document = response.json().await?;
                    Ok(Some(doc))
                }
                StatusCode::NOT_FOUND => Ok(None),
                status => Err(Self::error_from(status, &url, response).await),
            }
        })
        .await;

        record_request("get_document", collection, result.is_ok());
        result
    }

    /// Create a document with an explicit id.
    pub async fn create_document(
        &self,
        collection: &str,
        doc_id: &str,
        fields: HashMap<String, Value>,
    ) -> StoreResult<Document> {
        let url = format!("{}/{}?documentId={}", self.base_url, collection, doc_id);
        let body = Document::new(fields);

        let result = with_retry(&self.config.retry, "create_document", || {
            let body = body.clone();
            let url = url.clone();
            async move {
                let token = self.get_token().await?;
                let response = self
                    .http
                    .post(&url)
                    .bearer_auth(&token)
                    .json(&body)
                    .send()
                    .await?;

                match response.status() {
                    StatusCode::OK | StatusCode::CREATED => {
                        let doc: Document = response.json().await?;
                        Ok(doc)
                    }
                    StatusCode::CONFLICT => Err(StoreError::AlreadyExists(format!(
                        "{}/{}",
                        collection, doc_id
                    ))),
                    status => Err(Self::error_from(status, &url, response).await),
                }
            }
        })
        .await;

        if result.is_ok() {
            debug!(collection, doc_id, "Created document");
        }
        record_request("create_document", collection, result.is_ok());
        result
    }

    /// Merge-update fields on a document.
    pub async fn update_document(
        &self,
        collection: &str,
        doc_id: &str,
        fields: HashMap<String, Value>,
        update_mask: Vec<String>,
    ) -> StoreResult<Document> {
        let params: Vec<String> = update_mask
            .iter()
            .map(|f| format!("updateMask.fieldPaths={}", f))
            .collect();
        let url = format!(
            "{}?{}",
            self.document_path(collection, doc_id),
            params.join("&")
        );
        let body = Document::new(fields);

        let result = with_retry(&self.config.retry, "update_document", || {
            let body = body.clone();
            let url = url.clone();
            async move {
                let token = self.get_token().await?;
                let response = self
                    .http
                    .patch(&url)
                    .bearer_auth(&token)
                    .json(&body)
                    .send()
                    .await?;

                match response.status() {
                    StatusCode::OK => {
                        let doc: Document = response.json().await?;
                        Ok(doc)
                    }
                    StatusCode::NOT_FOUND => {
                        Err(StoreError::not_found(format!("{}/{}", collection, doc_id)))
                    }
                    status => Err(Self::error_from(status, &url, response).await),
                }
            }
        })
        .await;

        record_request("update_document", collection, result.is_ok());
        result
    }

    /// List every document in a collection, following pagination.
    pub async fn list_documents(&self, collection: &str) -> StoreResult<Vec<Document>> {
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut url = format!("{}/{}?pageSize=300", self.base_url, collection);
            if let Some(token) = &page_token {
                url.push_str("&pageToken=");
                url.push_str(token);
            }

            let page: ListDocumentsResponse =
                with_retry(&self.config.retry, "list_documents", || {
                    let url = url.clone();
                    async move {
                        let token = self.get_token().await?;
                        let response = self.http.get(&url).bearer_auth(&token).send().await?;

                        match response.status() {
                            StatusCode::OK => Ok(response.json().await?),
                            status => Err(Self::error_from(status, &url, response).await),
                        }
                    }
                })
                .await?;

            documents.extend(page.documents.unwrap_or_default());

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        record_request("list_documents", collection, true);
        Ok(documents)
    }

    async fn error_from(status: StatusCode, url: &str, response: reqwest::Response) -> StoreError {
        let body = response.text().await.unwrap_or_default();
        StoreError::from_http_status(status.as_u16(), format!("{} failed: {}", url, body))
    }
}
