use axum::{extract::State, Json};
use serde_json::Value;

use crate::analyzer::AnalysisResult;
use crate::errors::AppError;
use crate::state::AppState;

/// POST /api/v1/profile/analyze
/// Body is the raw profile record; malformed records still get an analysis.
pub async fn handle_analyze_profile(
    State(state): State<AppState>,
    Json(raw): Json<Value>,
) -> Result<Json<AnalysisResult>, AppError> {
    Ok(Json(state.analyzer.analyze_profile_value(&raw)?))
}
