//! Case and result repositories.
//!
//! The request pipeline only ever talks to these two traits; the Firestore
//! implementations below and the in-memory store in `memory.rs` are
//! interchangeable behind them.

use std::collections::HashMap;

use async_trait::async_trait;
use tracing::info;

use frec_models::{CaseId, CaseRecord, CaseStatus, EnhancementResult, ResultId};

use crate::client::FirestoreClient;
use crate::error::{StoreError, StoreResult};
use crate::types::{from_document, to_fields, Value};

const CASES_COLLECTION: &str = "cases";
const RESULTS_COLLECTION: &str = "results";

/// Persistence for case records.
#[async_trait]
pub trait CaseRepository: Send + Sync {
    /// Persist a new case.
    async fn insert(&self, case: &CaseRecord) -> StoreResult<()>;

    /// Fetch a case by id.
    async fn get(&self, case_id: &CaseId) -> StoreResult<Option<CaseRecord>>;

    /// Flip the case to `processed` and link the given result. Re-fired on
    /// every enhancement; the last write wins the `result_id` pointer.
    async fn mark_processed(&self, case_id: &CaseId, result_id: &ResultId) -> StoreResult<()>;

    /// Fetch every case.
    async fn list(&self) -> StoreResult<Vec<CaseRecord>>;

    /// Connectivity probe for the readiness endpoint.
    async fn ping(&self) -> StoreResult<()>;
}

/// Persistence for enhancement results. Results are write-once.
#[async_trait]
pub trait ResultRepository: Send + Sync {
    /// Persist a new result.
    async fn insert(&self, result: &EnhancementResult) -> StoreResult<()>;

    /// Fetch a result by id.
    async fn get(&self, result_id: &ResultId) -> StoreResult<Option<EnhancementResult>>;
}

/// Firestore-backed case repository.
pub struct FirestoreCaseRepository {
    client: FirestoreClient,
}

impl FirestoreCaseRepository {
    pub fn new(client: FirestoreClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CaseRepository for FirestoreCaseRepository {
    async fn insert(&self, case: &CaseRecord) -> StoreResult<()> {
        let fields = to_fields(case)?;
        self.client
            .create_document(CASES_COLLECTION, case.case_id.as_str(), fields)
            .await?;
        info!("Created case record: {}", case.case_id);
        Ok(())
    }

    async fn get(&self, case_id: &CaseId) -> StoreResult<Option<CaseRecord>> {
        let doc = self
            .client
            .get_document(CASES_COLLECTION, case_id.as_str())
            .await?;

        doc.map(|d| from_document(&d)).transpose()
    }

    async fn mark_processed(&self, case_id: &CaseId, result_id: &ResultId) -> StoreResult<()> {
        let mut fields = HashMap::new();
        fields.insert(
            "status".to_string(),
            Value::StringValue(CaseStatus::Processed.as_str().to_string()),
        );
        fields.insert(
            "result_id".to_string(),
            Value::StringValue(result_id.as_str().to_string()),
        );

        self.client
            .update_document(
                CASES_COLLECTION,
                case_id.as_str(),
                fields,
                vec!["status".to_string(), "result_id".to_string()],
            )
            .await?;
        Ok(())
    }

    async fn list(&self) -> StoreResult<Vec<CaseRecord>> {
        let docs = self.client.list_documents(CASES_COLLECTION).await?;
        docs.iter().map(from_document).collect()
    }

    async fn ping(&self) -> StoreResult<()> {
        // A missing probe document still proves the store is reachable.
        match self.client.get_document("_health", "_check").await {
            Ok(_) => Ok(()),
            Err(StoreError::NotFound(_)) => Ok(()),
            Err(e) => Err(e),
        }
    }
}

/// Firestore-backed result repository.
pub struct FirestoreResultRepository {
    client: FirestoreClient,
}

impl FirestoreResultRepository {
    pub fn new(client: FirestoreClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ResultRepository for FirestoreResultRepository {
    async fn insert(&self, result: &EnhancementResult) -> StoreResult<()> {
        let fields = to_fields(result)?;
        self.client
            .create_document(RESULTS_COLLECTION, result.result_id.as_str(), fields)
            .await?;
        info!(
            "Created result record: {} for case {}",
            result.result_id, result.case_id
        );
        Ok(())
    }

    async fn get(&self, result_id: &ResultId) -> StoreResult<Option<EnhancementResult>> {
        let doc = self
            .client
            .get_document(RESULTS_COLLECTION, result_id.as_str())
            .await?;

        doc.map(|d| from_document(&d)).transpose()
    }
}
