pub mod health;
pub mod profile;
pub mod recommendations;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/v1/recommendations",
            get(recommendations::handle_get_recommendations),
        )
        .route(
            "/api/v1/jobs/trending",
            get(recommendations::handle_trending_jobs),
        )
        .route(
            "/api/v1/jobs/:id/similar",
            get(recommendations::handle_similar_jobs),
        )
        .route(
            "/api/v1/profile/analyze",
            post(profile::handle_analyze_profile),
        )
        .with_state(state)
}
