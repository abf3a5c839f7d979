//! Enhancement orchestration: remote model first, local filters second,
//! passthrough last.
//!
//! This function is the pipeline's absorption boundary: no upstream or
//! decode failure escapes it, the caller always gets a usable image with
//! a confidence that reflects which path produced it.

use tracing::warn;

use frec_hf_client::{HfClient, REMOTE_CONFIDENCE};
use frec_models::{EnhancementProfile, ImageData};
use frec_vision::{enhance_local, PASSTHROUGH_CONFIDENCE, PASSTHROUGH_METHOD};

use crate::metrics::record_enhancement_fallback;

/// What an enhancement call produced.
#[derive(Debug, Clone)]
pub struct EnhancementOutcome {
    pub image: ImageData,
    pub confidence: f64,
    pub method: String,
}

/// Enhance a case's original image under the given profile.
pub async fn enhance_case(
    hf: &HfClient,
    profile: EnhancementProfile,
    original: &ImageData,
) -> EnhancementOutcome {
    let passthrough = || EnhancementOutcome {
        image: original.clone(),
        confidence: PASSTHROUGH_CONFIDENCE,
        method: PASSTHROUGH_METHOD.to_string(),
    };

    let bytes = match original.to_bytes() {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!("Stored image payload did not decode: {}", e);
            return passthrough();
        }
    };

    if hf.is_enabled() {
        match hf.enhance(profile.model(), &bytes).await {
            Ok(enhanced) => {
                return EnhancementOutcome {
                    image: ImageData::from_bytes("image/png", &enhanced),
                    confidence: REMOTE_CONFIDENCE,
                    method: format!("HuggingFace {}", profile.model()),
                };
            }
            Err(e) => {
                warn!(
                    profile = profile.as_str(),
                    "Remote enhancement failed, using local fallback: {}", e
                );
            }
        }
    }

    record_enhancement_fallback(profile.as_str());

    let mime = original.mime().unwrap_or("image/png").to_string();
    let local = tokio::task::spawn_blocking(move || enhance_local(&bytes, &mime)).await;

    match local {
        Ok(enhanced) => EnhancementOutcome {
            image: ImageData::from_bytes(&enhanced.mime, &enhanced.bytes),
            confidence: enhanced.confidence,
            method: enhanced.method.to_string(),
        },
        Err(e) => {
            warn!("Local enhancement task failed: {}", e);
            passthrough()
        }
    }
}
