//! Face presence check backed by the rustface (SeetaFace) frontal detector.

use std::io::Cursor;
use std::path::Path;

use tracing::{debug, warn};

/// Outcome of a face scan. Never an error: any decode or detector problem
/// is reported as "no faces, zero confidence" so detection can never block
/// an upload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceScan {
    pub faces_detected: bool,
    pub face_count: u32,
    /// Confidence estimate derived from the count, capped at 0.9.
    pub confidence: f64,
}

impl FaceScan {
    /// A scan that found nothing (also the degraded-failure value).
    pub fn empty() -> Self {
        Self {
            faces_detected: false,
            face_count: 0,
            confidence: 0.0,
        }
    }

    fn from_count(count: u32) -> Self {
        Self {
            faces_detected: count > 0,
            face_count: count,
            confidence: (0.3 + count as f64 * 0.2).min(0.9),
        }
    }
}

/// Frontal face detector wrapping a SeetaFace model.
///
/// The model binary is loaded once at startup; each scan builds a fresh
/// `rustface::Detector` because detectors are not `Sync`.
pub struct FaceDetector {
    model: Option<rustface::Model>,
}

impl FaceDetector {
    /// Load the model from `FACE_MODEL_PATH`. A missing or unreadable
    /// model leaves the detector disabled rather than failing startup.
    pub fn from_env() -> Self {
        match std::env::var("FACE_MODEL_PATH") {
            Ok(path) if !path.is_empty() => Self::from_model_file(path),
            _ => {
                warn!("FACE_MODEL_PATH not set; face detection disabled");
                Self::disabled()
            }
        }
    }

    /// Load a SeetaFace model binary from disk.
    pub fn from_model_file(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let model = std::fs::read(path)
            .map_err(|e| warn!("Failed to read face model {}: {}", path.display(), e))
            .ok()
            .and_then(|bytes| {
                rustface::read_model(Cursor::new(bytes))
                    .map_err(|e| warn!("Failed to parse face model {}: {}", path.display(), e))
                    .ok()
            });

        if model.is_some() {
            debug!("Loaded face detection model from {}", path.display());
        }

        Self { model }
    }

    /// A detector that always reports zero faces.
    pub fn disabled() -> Self {
        Self { model: None }
    }

    /// Whether a model is loaded.
    pub fn is_enabled(&self) -> bool {
        self.model.is_some()
    }

    /// Scan encoded image bytes for faces. CPU-bound; callers on an async
    /// runtime should run this on a blocking worker.
    pub fn scan(&self, image_bytes: &[u8]) -> FaceScan {
        let Some(model) = &self.model else {
            return FaceScan::empty();
        };

        let gray = match image::load_from_memory(image_bytes) {
            Ok(img) => img.to_luma8(),
            Err(e) => {
                warn!("Face scan could not decode image: {}", e);
                return FaceScan::empty();
            }
        };

        let mut detector = rustface::create_detector_with_model(model.clone());
        detector.set_min_face_size(20);
        detector.set_score_thresh(2.0);
        detector.set_pyramid_scale_factor(0.8);
        detector.set_slide_window_step(4, 4);

        let (width, height) = gray.dimensions();
        let faces = detector.detect(&rustface::ImageData::new(gray.as_raw(), width, height));

        let scan = FaceScan::from_count(faces.len() as u32);
        debug!(
            face_count = scan.face_count,
            confidence = scan.confidence,
            "Face scan complete"
        );
        scan
    }
}
