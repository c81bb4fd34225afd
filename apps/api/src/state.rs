use crate::analyzer::ProfileAnalyzer;
use crate::recommendation::RecommendationService;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub recommendations: RecommendationService,
    pub analyzer: ProfileAnalyzer,
}
