//! Aggregate case statistics, computed over the full case list at call time.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::case::{CaseRecord, CaseStatus};

/// Aggregates returned alongside the case list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CaseStatistics {
    pub total_cases: u64,
    pub processed_cases: u64,
    /// Total faces found across all cases
    pub faces_detected: u64,
    /// Percentage of cases that reached `processed`; 0 when there are none
    pub processing_rate: f64,
}

impl CaseStatistics {
    /// Compute aggregates over a case list.
    pub fn compute(cases: &[CaseRecord]) -> Self {
        let total_cases = cases.len() as u64;
        let processed_cases = cases
            .iter()
            .filter(|c| c.status == CaseStatus::Processed)
            .count() as u64;
        let faces_detected = cases.iter().map(|c| c.face_count as u64).sum();

        let processing_rate = if total_cases > 0 {
            processed_cases as f64 / total_cases as f64 * 100.0
        } else {
            0.0
        };

        Self {
            total_cases,
            processed_cases,
            faces_detected,
            processing_rate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::case::CaseId;
    use crate::image_data::ImageData;
    use chrono::Utc;

    fn case(status: CaseStatus, face_count: u32) -> CaseRecord {
        CaseRecord {
            case_id: CaseId::new(),
            original_image: ImageData::from_bytes("image/png", b"x"),
            filename: "x.png".to_string(),
            upload_time: Utc::now(),
            faces_detected: face_count > 0,
            face_count,
            detection_confidence: 0.0,
            file_size: 1,
            image_format: "image/png".to_string(),
            status,
            result_id: None,
        }
    }

    #[test]
    fn empty_store_yields_zero_rate() {
        let stats = CaseStatistics::compute(&[]);
        assert_eq!(stats.total_cases, 0);
        assert_eq!(stats.processing_rate, 0.0);
    }

    #[test]
    fn counts_and_rate() {
        let cases = vec![
            case(CaseStatus::Processed, 2),
            case(CaseStatus::Uploaded, 1),
            case(CaseStatus::Processed, 0),
            case(CaseStatus::Uploaded, 0),
        ];
        let stats = CaseStatistics::compute(&cases);
        assert_eq!(stats.total_cases, 4);
        assert_eq!(stats.processed_cases, 2);
        assert_eq!(stats.faces_detected, 3);
        assert_eq!(stats.processing_rate, 50.0);
    }
}
