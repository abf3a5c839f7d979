//! Inference client error types.

use thiserror::Error;

pub type HfResult<T> = Result<T, HfError>;

#[derive(Debug, Error)]
pub enum HfError {
    #[error("Inference API disabled: no credential configured")]
    Disabled,

    #[error("Model still loading after {attempts} attempts")]
    ModelLoading { attempts: u32 },

    #[error("Inference API returned {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl HfError {
    /// Whether another attempt could help. Non-200 responses other than
    /// 503 are terminal for the request.
    pub fn is_retryable(&self) -> bool {
        matches!(self, HfError::ModelLoading { .. } | HfError::Network(_))
    }
}
