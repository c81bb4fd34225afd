use std::time::Duration;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::{
    RecommendationFilters, RecommendationRequest, RecommendationSort, SimilarJob, TrendingJob,
};
use crate::recommendation::RecommendationPage;
use crate::state::AppState;

const DEFAULT_SIMILAR_LIMIT: usize = 10;
const DEFAULT_TRENDING_LIMIT: usize = 10;
const DEFAULT_TRENDING_WINDOW_HOURS: u64 = 24 * 7;

/// Query string form of a recommendation request. List filters are comma-separated.
#[derive(Debug, Default, Deserialize)]
pub struct RecommendationQuery {
    pub user_id: String,
    pub limit: Option<usize>,
    pub page: Option<usize>,
    pub sort: Option<RecommendationSort>,
    pub locations: Option<String>,
    pub skills: Option<String>,
    pub industries: Option<String>,
    pub exclude: Option<String>,
    pub remote_only: Option<bool>,
    pub salary_min: Option<u32>,
    pub timeout_ms: Option<u64>,
}

fn split_list(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

impl RecommendationQuery {
    fn to_request(&self) -> RecommendationRequest {
        let defaults = RecommendationRequest::default();
        RecommendationRequest {
            filters: RecommendationFilters {
                locations: split_list(self.locations.as_deref()),
                remote_only: self.remote_only.unwrap_or(false),
                skills: split_list(self.skills.as_deref()),
                salary_min: self.salary_min,
                industries: split_list(self.industries.as_deref()),
                exclude_job_ids: split_list(self.exclude.as_deref()),
                ..Default::default()
            },
            sort: self.sort.unwrap_or_default(),
            limit: self.limit.unwrap_or(defaults.limit),
            page: self.page.unwrap_or(defaults.page),
            timeout_ms: self.timeout_ms,
        }
    }
}

/// GET /api/v1/recommendations
pub async fn handle_get_recommendations(
    State(state): State<AppState>,
    Query(query): Query<RecommendationQuery>,
) -> Result<Json<RecommendationPage>, AppError> {
    let page = state
        .recommendations
        .get_recommendations(&query.user_id, &query.to_request())
        .await?;
    Ok(Json(page))
}

#[derive(Debug, Deserialize)]
pub struct SimilarQuery {
    pub user_id: String,
    pub limit: Option<usize>,
}

/// GET /api/v1/jobs/:id/similar
pub async fn handle_similar_jobs(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
    Query(query): Query<SimilarQuery>,
) -> Result<Json<Vec<SimilarJob>>, AppError> {
    let jobs = state
        .recommendations
        .get_similar_jobs(
            &job_id,
            &query.user_id,
            query.limit.unwrap_or(DEFAULT_SIMILAR_LIMIT),
        )
        .await?;
    Ok(Json(jobs))
}

#[derive(Debug, Deserialize)]
pub struct TrendingQuery {
    pub user_id: String,
    pub limit: Option<usize>,
    pub window_hours: Option<u64>,
}

/// GET /api/v1/jobs/trending
pub async fn handle_trending_jobs(
    State(state): State<AppState>,
    Query(query): Query<TrendingQuery>,
) -> Result<Json<Vec<TrendingJob>>, AppError> {
    let hours = query.window_hours.unwrap_or(DEFAULT_TRENDING_WINDOW_HOURS);
    let jobs = state
        .recommendations
        .get_trending_jobs(
            &query.user_id,
            query.limit.unwrap_or(DEFAULT_TRENDING_LIMIT),
            Duration::from_secs(hours.saturating_mul(3600)),
        )
        .await?;
    Ok(Json(jobs))
}
