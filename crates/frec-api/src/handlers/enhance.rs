//! Enhancement handler.

use std::time::Instant;

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use frec_models::{
    CaseId, EnhancementProfile, EnhancementResult, ImageData, ResultId, ResultStatus,
};

use crate::error::{ApiError, ApiResult};
use crate::metrics::record_enhancement;
use crate::services::enhance_case;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct EnhanceQuery {
    /// Profile name; unknown values silently map to the default profile.
    pub enhancement_type: Option<String>,
}

#[derive(Serialize)]
pub struct EnhanceResponse {
    pub result_id: ResultId,
    pub enhanced_image: ImageData,
    pub confidence_score: f64,
    pub method_used: String,
    pub processing_time: f64,
    pub forensic_grade: bool,
    pub model_description: String,
    pub message: String,
}

/// Enhance a case's image. Never fails on upstream trouble: the result is
/// produced by the remote model, the local filter pipeline, or a
/// passthrough, in that order of preference. Each call creates a fresh
/// result and re-links the case to it.
pub async fn enhance_face(
    State(state): State<AppState>,
    Path(case_id): Path<String>,
    Query(query): Query<EnhanceQuery>,
) -> ApiResult<Json<EnhanceResponse>> {
    let case = state
        .store
        .cases
        .get(&CaseId::from(case_id))
        .await?
        .ok_or_else(|| ApiError::not_found("Case not found"))?;

    let profile =
        EnhancementProfile::parse_or_default(query.enhancement_type.as_deref().unwrap_or(""));

    let start = Instant::now();
    let outcome = enhance_case(&state.hf, profile, &case.original_image).await;
    let processing_time = start.elapsed().as_secs_f64();

    let result = EnhancementResult {
        result_id: ResultId::new(),
        case_id: case.case_id.clone(),
        original_image: case.original_image.clone(),
        enhanced_image: outcome.image,
        enhancement_type: profile,
        confidence_score: outcome.confidence,
        method_used: outcome.method,
        processing_time,
        model_info: profile.description().to_string(),
        processing_timestamp: Utc::now(),
        status: ResultStatus::Completed,
        forensic_grade: EnhancementResult::is_forensic_grade(outcome.confidence),
    };

    state.store.results.insert(&result).await?;
    state
        .store
        .cases
        .mark_processed(&case.case_id, &result.result_id)
        .await?;

    record_enhancement(profile.as_str(), &result.method_used, processing_time);

    info!(
        case_id = %case.case_id,
        result_id = %result.result_id,
        profile = profile.as_str(),
        method = %result.method_used,
        confidence = result.confidence_score,
        "Enhancement completed"
    );

    Ok(Json(EnhanceResponse {
        result_id: result.result_id,
        enhanced_image: result.enhanced_image,
        confidence_score: result.confidence_score,
        method_used: result.method_used,
        processing_time,
        forensic_grade: result.forensic_grade,
        model_description: profile.description().to_string(),
        message: "Face enhancement completed".to_string(),
    }))
}
