//! Enhancement results: one enhancement attempt's output and metadata.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::case::CaseId;
use crate::image_data::ImageData;
use crate::profile::EnhancementProfile;

/// Confidence at or above which a result is flagged forensic grade.
pub const FORENSIC_GRADE_THRESHOLD: f64 = 0.8;

/// Unique identifier for an enhancement result.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct ResultId(pub String);

impl ResultId {
    /// Generate a new random result ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ResultId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ResultId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ResultId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ResultId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Result lifecycle state. Results are written once, after the enhancement
/// finished, so the only state is `Completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum ResultStatus {
    #[default]
    Completed,
}

impl ResultStatus {
    pub fn as_str(&self) -> &'static str {
        "completed"
    }
}

/// One enhancement attempt's output, stored in the `results` collection.
/// Immutable after creation; always references an existing case.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct EnhancementResult {
    /// Unique result ID
    pub result_id: ResultId,

    /// Case this result belongs to
    pub case_id: CaseId,

    /// The case's original image at enhancement time
    pub original_image: ImageData,

    /// Enhanced image as a data URI
    pub enhanced_image: ImageData,

    /// Profile that was applied
    pub enhancement_type: EnhancementProfile,

    /// Confidence score in [0, 1]
    pub confidence_score: f64,

    /// Which path produced the image (remote model or local fallback)
    pub method_used: String,

    /// Wall-clock processing time in seconds
    pub processing_time: f64,

    /// Description of the profile's model
    pub model_info: String,

    /// When the enhancement finished
    pub processing_timestamp: DateTime<Utc>,

    /// Lifecycle state
    pub status: ResultStatus,

    /// Whether the confidence clears [`FORENSIC_GRADE_THRESHOLD`]
    pub forensic_grade: bool,
}

impl EnhancementResult {
    /// Derive the forensic-grade flag from a confidence score.
    pub fn is_forensic_grade(confidence: f64) -> bool {
        confidence >= FORENSIC_GRADE_THRESHOLD
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forensic_grade_threshold_is_inclusive() {
        assert!(EnhancementResult::is_forensic_grade(0.8));
        assert!(EnhancementResult::is_forensic_grade(0.92));
        assert!(!EnhancementResult::is_forensic_grade(0.75));
        assert!(!EnhancementResult::is_forensic_grade(0.5));
    }

    #[test]
    fn status_serializes_completed() {
        assert_eq!(
            serde_json::to_string(&ResultStatus::Completed).unwrap(),
            "\"completed\""
        );
    }
}
