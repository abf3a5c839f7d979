//! In-memory store.
//!
//! Used when no Firestore project is configured, and by the API test
//! suite. Single-document writes are atomic under the map locks, matching
//! the store contract the pipeline relies on.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use frec_models::{CaseId, CaseRecord, CaseStatus, EnhancementResult, ResultId};

use crate::error::{StoreError, StoreResult};
use crate::repos::{CaseRepository, ResultRepository};

/// Map-backed implementation of both repositories.
#[derive(Clone, Default)]
pub struct MemoryStore {
    cases: Arc<RwLock<HashMap<String, CaseRecord>>>,
    results: Arc<RwLock<HashMap<String, EnhancementResult>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CaseRepository for MemoryStore {
    async fn insert(&self, case: &CaseRecord) -> StoreResult<()> {
        let mut cases = self.cases.write().await;
        if cases.contains_key(case.case_id.as_str()) {
            return Err(StoreError::AlreadyExists(format!(
                "cases/{}",
                case.case_id
            )));
        }
        cases.insert(case.case_id.as_str().to_string(), case.clone());
        Ok(())
    }

    async fn get(&self, case_id: &CaseId) -> StoreResult<Option<CaseRecord>> {
        Ok(self.cases.read().await.get(case_id.as_str()).cloned())
    }

    async fn mark_processed(&self, case_id: &CaseId, result_id: &ResultId) -> StoreResult<()> {
        let mut cases = self.cases.write().await;
        let case = cases
            .get_mut(case_id.as_str())
            .ok_or_else(|| StoreError::not_found(format!("cases/{}", case_id)))?;
        case.status = CaseStatus::Processed;
        case.result_id = Some(result_id.clone());
        Ok(())
    }

    async fn list(&self) -> StoreResult<Vec<CaseRecord>> {
        Ok(self.cases.read().await.values().cloned().collect())
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

#[async_trait]
impl ResultRepository for MemoryStore {
    async fn insert(&self, result: &EnhancementResult) -> StoreResult<()> {
        let mut results = self.results.write().await;
        if results.contains_key(result.result_id.as_str()) {
            return Err(StoreError::AlreadyExists(format!(
                "results/{}",
                result.result_id
            )));
        }
        results.insert(result.result_id.as_str().to_string(), result.clone());
        Ok(())
    }

    async fn get(&self, result_id: &ResultId) -> StoreResult<Option<EnhancementResult>> {
        Ok(self.results.read().await.get(result_id.as_str()).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use frec_models::ImageData;

    fn sample_case() -> CaseRecord {
        CaseRecord {
            case_id: CaseId::new(),
            original_image: ImageData::from_bytes("image/png", b"img"),
            filename: "scene.png".to_string(),
            upload_time: Utc::now(),
            faces_detected: true,
            face_count: 1,
            detection_confidence: 0.5,
            file_size: 3,
            image_format: "image/png".to_string(),
            status: CaseStatus::Uploaded,
            result_id: None,
        }
    }

    #[tokio::test]
    async fn insert_then_get_round_trips() {
        let store = MemoryStore::new();
        let case = sample_case();
        CaseRepository::insert(&store, &case).await.unwrap();

        let fetched = CaseRepository::get(&store, &case.case_id).await.unwrap().unwrap();
        assert_eq!(fetched.filename, "scene.png");
        assert_eq!(fetched.status, CaseStatus::Uploaded);
    }

    #[tokio::test]
    async fn duplicate_insert_conflicts() {
        let store = MemoryStore::new();
        let case = sample_case();
        CaseRepository::insert(&store, &case).await.unwrap();
        assert!(matches!(
            CaseRepository::insert(&store, &case).await,
            Err(StoreError::AlreadyExists(_))
        ));
    }

    #[tokio::test]
    async fn mark_processed_relinks_latest_result() {
        let store = MemoryStore::new();
        let case = sample_case();
        CaseRepository::insert(&store, &case).await.unwrap();

        let first = ResultId::new();
        let second = ResultId::new();
        store.mark_processed(&case.case_id, &first).await.unwrap();
        store.mark_processed(&case.case_id, &second).await.unwrap();

        let fetched = CaseRepository::get(&store, &case.case_id).await.unwrap().unwrap();
        assert_eq!(fetched.status, CaseStatus::Processed);
        assert_eq!(fetched.result_id, Some(second));
    }

    #[tokio::test]
    async fn mark_processed_missing_case_is_not_found() {
        let store = MemoryStore::new();
        let err = store
            .mark_processed(&CaseId::new(), &ResultId::new())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }
}
