//! Upload and case/result read handlers.

use std::sync::Arc;

use axum::extract::{Multipart, Path, State};
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use tracing::info;

use frec_models::{CaseId, CaseRecord, CaseStatistics, CaseStatus, EnhancementResult, ImageData, ResultId};

use crate::error::{ApiError, ApiResult};
use crate::metrics::record_upload;
use crate::state::AppState;

/// Response for a successful upload.
#[derive(Serialize)]
pub struct UploadResponse {
    pub case_id: CaseId,
    pub faces_detected: bool,
    pub face_count: u32,
    pub detection_confidence: f64,
    pub file_size: u64,
    pub message: String,
}

/// Upload an image, run the face presence check, and persist a case.
///
/// The only hard validation is the content-type prefix; a failed face
/// scan degrades to zero faces instead of rejecting the upload.
pub async fn upload_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<UploadResponse>> {
    let mut file = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() == Some("file") {
            let content_type = field.content_type().unwrap_or_default().to_string();
            let filename = field.file_name().unwrap_or("upload").to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::bad_request(format!("Failed to read upload: {}", e)))?;
            file = Some((content_type, filename, bytes));
            break;
        }
    }

    let Some((content_type, filename, bytes)) = file else {
        return Err(ApiError::bad_request("Missing 'file' field"));
    };

    if !content_type.starts_with("image/") {
        return Err(ApiError::bad_request("File must be an image"));
    }

    // The scan is CPU-bound; keep it off the async workers.
    let detector = Arc::clone(&state.detector);
    let scan_bytes = bytes.clone();
    let scan = tokio::task::spawn_blocking(move || detector.scan(&scan_bytes))
        .await
        .map_err(|e| ApiError::internal(format!("Face scan task failed: {}", e)))?;

    let case = CaseRecord {
        case_id: CaseId::new(),
        original_image: ImageData::from_bytes(&content_type, &bytes),
        filename,
        upload_time: Utc::now(),
        faces_detected: scan.faces_detected,
        face_count: scan.face_count,
        detection_confidence: scan.confidence,
        file_size: bytes.len() as u64,
        image_format: content_type,
        status: CaseStatus::Uploaded,
        result_id: None,
    };

    state.store.cases.insert(&case).await?;
    record_upload(scan.face_count);

    info!(
        case_id = %case.case_id,
        face_count = scan.face_count,
        file_size = case.file_size,
        "Case uploaded"
    );

    Ok(Json(UploadResponse {
        case_id: case.case_id,
        faces_detected: scan.faces_detected,
        face_count: scan.face_count,
        detection_confidence: scan.confidence,
        file_size: bytes.len() as u64,
        message: "Image uploaded and analyzed".to_string(),
    }))
}

/// Fetch a full case record.
pub async fn get_case(
    State(state): State<AppState>,
    Path(case_id): Path<String>,
) -> ApiResult<Json<CaseRecord>> {
    let case = state
        .store
        .cases
        .get(&CaseId::from(case_id))
        .await?
        .ok_or_else(|| ApiError::not_found("Case not found"))?;

    Ok(Json(case))
}

/// Fetch a full enhancement result record.
pub async fn get_result(
    State(state): State<AppState>,
    Path(result_id): Path<String>,
) -> ApiResult<Json<EnhancementResult>> {
    let result = state
        .store
        .results
        .get(&ResultId::from(result_id))
        .await?
        .ok_or_else(|| ApiError::not_found("Result not found"))?;

    Ok(Json(result))
}

/// Case list with aggregate statistics.
#[derive(Serialize)]
pub struct CasesResponse {
    pub cases: Vec<CaseRecord>,
    pub statistics: CaseStatistics,
}

/// List all cases, newest first, with aggregates computed over the full
/// set at call time.
pub async fn list_cases(State(state): State<AppState>) -> ApiResult<Json<CasesResponse>> {
    let mut cases = state.store.cases.list().await?;
    cases.sort_by(|a, b| b.upload_time.cmp(&a.upload_time));

    let statistics = CaseStatistics::compute(&cases);

    Ok(Json(CasesResponse { cases, statistics }))
}
