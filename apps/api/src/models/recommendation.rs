use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::job::{ExperienceLevel, JobProfile, JobType, SalaryRange};
use crate::scoring::{MatchExplanation, MatchType, ScoreBreakdown};

/// Preferences held by the preferences store, separate from the profile's own
/// `JobPreferences`. Read-only to the core.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserPreferences {
    pub user_id: String,
    pub salary: Option<SalaryRange>,
    #[serde(default)]
    pub locations: Vec<String>,
    #[serde(default)]
    pub industries: Vec<String>,
    #[serde(default)]
    pub remote_only: bool,
}

/// Caller-supplied narrowing of the job pool.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecommendationFilters {
    #[serde(default)]
    pub locations: Vec<String>,
    #[serde(default)]
    pub remote_only: bool,
    #[serde(default)]
    pub experience_levels: Vec<ExperienceLevel>,
    #[serde(default)]
    pub skills: Vec<String>,
    pub salary_min: Option<u32>,
    #[serde(default)]
    pub industries: Vec<String>,
    #[serde(default)]
    pub job_types: Vec<JobType>,
    /// Jobs the caller never wants to see again (dismissed, hidden).
    #[serde(default)]
    pub exclude_job_ids: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationSort {
    #[default]
    Score,
    Recent,
    Salary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationRequest {
    #[serde(default)]
    pub filters: RecommendationFilters,
    #[serde(default)]
    pub sort: RecommendationSort,
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// 1-based.
    #[serde(default = "default_page")]
    pub page: usize,
    /// Overrides the configured request deadline.
    pub timeout_ms: Option<u64>,
}

fn default_limit() -> usize {
    20
}

fn default_page() -> usize {
    1
}

impl Default for RecommendationRequest {
    fn default() -> Self {
        Self {
            filters: RecommendationFilters::default(),
            sort: RecommendationSort::default(),
            limit: default_limit(),
            page: default_page(),
            timeout_ms: None,
        }
    }
}

/// Denormalized view of a job carried inside recommendation payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSummary {
    pub id: String,
    pub title: String,
    pub company_name: String,
    pub location: String,
    pub is_remote: bool,
    pub job_type: JobType,
    pub salary: Option<SalaryRange>,
    pub posted_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl From<&JobProfile> for JobSummary {
    fn from(job: &JobProfile) -> Self {
        Self {
            id: job.id.clone(),
            title: job.title.clone(),
            company_name: job.company.name.clone(),
            location: job.location.clone(),
            is_remote: job.is_remote,
            job_type: job.job_type,
            salary: job.salary.clone(),
            posted_at: job.posted_at,
            expires_at: job.expires_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecommendation {
    pub job: JobSummary,
    /// 0–100, after collaborative boosting: `match_details.overall_score + boost`.
    pub match_score: f64,
    /// Points added by collaborative boosting; 0 when the job had no signal.
    pub boost: f64,
    pub match_type: MatchType,
    /// 0–1
    pub match_confidence: f64,
    /// Scorer output before boosting.
    pub match_details: ScoreBreakdown,
    pub explanation: MatchExplanation,
    pub last_matched: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub limit: usize,
    pub has_more: bool,
}

impl<T> PaginatedResponse<T> {
    /// Slices `all` into the requested 1-based page.
    pub fn from_ranked(all: Vec<T>, page: usize, limit: usize) -> Self {
        let total = all.len();
        let start = page.saturating_sub(1).saturating_mul(limit);
        let items: Vec<T> = all.into_iter().skip(start).take(limit).collect();
        let has_more = start.saturating_add(items.len()) < total;
        Self {
            items,
            total,
            page,
            limit,
            has_more,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarJob {
    pub job: JobSummary,
    /// 0–1 token-set similarity to the reference job.
    pub similarity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendingJob {
    pub job: JobSummary,
    pub application_count: u32,
    /// 0–1, `application_count / TRENDING_DIVISOR` capped at 1.
    pub trend_score: f64,
}
