//! Model catalog handler.

use std::collections::BTreeMap;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use frec_models::EnhancementProfile;

use crate::state::AppState;

#[derive(Serialize)]
pub struct ModelInfo {
    pub model: String,
    pub description: String,
}

#[derive(Serialize)]
pub struct ModelsResponse {
    pub models: BTreeMap<String, ModelInfo>,
    pub api_status: String,
}

/// List the available enhancement profiles and whether the remote API is
/// in use.
pub async fn list_models(State(state): State<AppState>) -> Json<ModelsResponse> {
    let models = EnhancementProfile::ALL
        .iter()
        .map(|profile| {
            (
                profile.as_str().to_string(),
                ModelInfo {
                    model: profile.model().to_string(),
                    description: profile.description().to_string(),
                },
            )
        })
        .collect();

    Json(ModelsResponse {
        models,
        api_status: if state.hf.is_enabled() {
            "active"
        } else {
            "fallback_mode"
        }
        .to_string(),
    })
}
