//! Document store for cases and results.
//!
//! This crate provides:
//! - `CaseRepository` / `ResultRepository` traits, the narrow interface
//!   the request pipeline talks to
//! - A Firestore REST implementation (service account auth via gcp_auth,
//!   retry with exponential backoff)
//! - An in-memory implementation used when no Firestore project is
//!   configured, and by tests

pub mod client;
pub mod error;
pub mod memory;
mod metrics;
pub mod repos;
pub mod retry;
pub mod types;

use std::sync::Arc;

use tracing::info;

pub use client::{FirestoreClient, FirestoreConfig};
pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use repos::{
    CaseRepository, FirestoreCaseRepository, FirestoreResultRepository, ResultRepository,
};
pub use retry::RetryConfig;

/// Which backend a [`Store`] was built on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Firestore,
    Memory,
}

impl StoreBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreBackend::Firestore => "firestore",
            StoreBackend::Memory => "memory",
        }
    }
}

/// Handle bundling the two repositories behind trait objects.
#[derive(Clone)]
pub struct Store {
    pub cases: Arc<dyn CaseRepository>,
    pub results: Arc<dyn ResultRepository>,
    pub backend: StoreBackend,
}

impl Store {
    /// Build a store from the environment: Firestore when a project is
    /// configured, otherwise in-memory so the service runs without
    /// credentials.
    pub async fn from_env() -> StoreResult<Self> {
        let has_project = std::env::var("GCP_PROJECT_ID")
            .or_else(|_| std::env::var("FIREBASE_PROJECT_ID"))
            .map(|v| !v.is_empty())
            .unwrap_or(false);

        if has_project {
            let client = FirestoreClient::from_env().await?;
            info!("Using Firestore document store");
            Ok(Self::firestore(client))
        } else {
            info!("No Firestore project configured; using in-memory store");
            Ok(Self::in_memory())
        }
    }

    /// Firestore-backed store.
    pub fn firestore(client: FirestoreClient) -> Self {
        Self {
            cases: Arc::new(FirestoreCaseRepository::new(client.clone())),
            results: Arc::new(FirestoreResultRepository::new(client)),
            backend: StoreBackend::Firestore,
        }
    }

    /// In-memory store, shared between both repositories.
    pub fn in_memory() -> Self {
        let memory = MemoryStore::new();
        Self {
            cases: Arc::new(memory.clone()),
            results: Arc::new(memory),
            backend: StoreBackend::Memory,
        }
    }
}
