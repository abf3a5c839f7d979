//! Face presence check and the local fallback enhancement pipeline.
//!
//! Both components are designed to degrade instead of fail: a scan that
//! cannot run reports zero faces, and the enhancer always returns usable
//! bytes even when the input does not decode.

pub mod detect;
pub mod enhance;

pub use detect::{FaceDetector, FaceScan};
pub use enhance::{
    enhance_local, EnhancedImage, FALLBACK_CONFIDENCE, FALLBACK_METHOD,
    PASSTHROUGH_CONFIDENCE, PASSTHROUGH_METHOD,
};
