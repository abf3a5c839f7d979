//! Application state.

use std::sync::Arc;

use frec_hf_client::HfClient;
use frec_store::Store;
use frec_vision::FaceDetector;

use crate::config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub store: Store,
    pub hf: Arc<HfClient>,
    pub detector: Arc<FaceDetector>,
}

impl AppState {
    /// Create application state from the environment.
    pub async fn new(config: ApiConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let store = Store::from_env().await?;
        let hf = HfClient::from_env()?;
        let detector = FaceDetector::from_env();

        Ok(Self {
            config,
            store,
            hf: Arc::new(hf),
            detector: Arc::new(detector),
        })
    }

    /// Assemble state from explicit parts. Used by tests.
    pub fn with_parts(
        config: ApiConfig,
        store: Store,
        hf: HfClient,
        detector: FaceDetector,
    ) -> Self {
        Self {
            config,
            store,
            hf: Arc::new(hf),
            detector: Arc::new(detector),
        }
    }
}
