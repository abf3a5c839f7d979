//! Case records: one uploaded image and its detection metadata.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::image_data::ImageData;
use crate::result::ResultId;

/// Unique identifier for an uploaded case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct CaseId(pub String);

impl CaseId {
    /// Generate a new random case ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for CaseId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for CaseId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for CaseId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Lifecycle state of a case.
///
/// A case is created as `Uploaded` and transitions to `Processed` on its
/// first completed enhancement. Re-enhancing a processed case re-fires the
/// transition and relinks `result_id`; it never goes back to `Uploaded`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    #[default]
    Uploaded,
    Processed,
}

impl CaseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaseStatus::Uploaded => "uploaded",
            CaseStatus::Processed => "processed",
        }
    }
}

impl fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One uploaded image with its detection metadata, stored in the `cases`
/// collection. Never deleted by this service.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CaseRecord {
    /// Unique case ID
    pub case_id: CaseId,

    /// Uploaded image as a data URI
    pub original_image: ImageData,

    /// Original filename from the multipart upload
    pub filename: String,

    /// Upload timestamp
    pub upload_time: DateTime<Utc>,

    /// Whether any face was found
    pub faces_detected: bool,

    /// Number of faces found
    pub face_count: u32,

    /// Detection confidence estimate derived from the face count
    pub detection_confidence: f64,

    /// Upload size in bytes
    pub file_size: u64,

    /// MIME type of the uploaded image
    pub image_format: String,

    /// Lifecycle state
    pub status: CaseStatus,

    /// Most recently linked result, set once the case is processed.
    /// Prior results stay retrievable by their own id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_id: Option<ResultId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn case_ids_are_unique() {
        assert_ne!(CaseId::new().as_str(), CaseId::new().as_str());
    }

    #[test]
    fn status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&CaseStatus::Uploaded).unwrap(),
            "\"uploaded\""
        );
        assert_eq!(
            serde_json::to_string(&CaseStatus::Processed).unwrap(),
            "\"processed\""
        );
    }

    #[test]
    fn record_omits_unset_result_id() {
        let case = CaseRecord {
            case_id: CaseId::new(),
            original_image: ImageData::from_bytes("image/png", b"fake"),
            filename: "face.png".to_string(),
            upload_time: Utc::now(),
            faces_detected: false,
            face_count: 0,
            detection_confidence: 0.0,
            file_size: 4,
            image_format: "image/png".to_string(),
            status: CaseStatus::Uploaded,
            result_id: None,
        };

        let json = serde_json::to_value(&case).unwrap();
        assert!(json.get("result_id").is_none());
        assert_eq!(json["status"], "uploaded");
    }
}
