use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::cache::{CacheKey, CacheStore};
use crate::clock::Clock;
use crate::config::RecommendationConfig;
use crate::errors::AppError;
use crate::events::{DomainEvent, EventPublisher, RecommendationGenerated};
use crate::models::{
    JobProfile, JobRecommendation, JobSummary, PaginatedResponse, RecommendationRequest,
    SimilarJob, TrendingJob,
};
use crate::recommendation::context::{matches_skill_filter, RecommendationContext};
use crate::recommendation::interactions::InteractionLog;
use crate::recommendation::ranking::{apply_boosts, sort_ranked, Ranked};
use crate::recommendation::similarity::SimilarityProvider;
use crate::scoring::text::{jaccard, tokenize};
use crate::scoring::{batch_calculate_matches, BatchOptions, MatchScorer};
use crate::store::{JobCriteria, PreferencesStore, ProfileStore};

pub type RecommendationPage = PaginatedResponse<JobRecommendation>;

const TITLE_WEIGHT: f64 = 0.3;
const DESCRIPTION_WEIGHT: f64 = 0.7;
const MIN_SIMILARITY: f64 = 0.1;
/// Applications at which a job counts as fully trending.
pub const TRENDING_DIVISOR: f64 = 100.0;

/// Collaborators of the recommendation service.
#[derive(Clone)]
pub struct RecommendationDeps {
    pub profiles: Arc<dyn ProfileStore>,
    pub preferences: Arc<dyn PreferencesStore>,
    pub scorer: Arc<dyn MatchScorer>,
    pub cache: Arc<dyn CacheStore<RecommendationPage>>,
    pub publisher: Arc<dyn EventPublisher>,
    pub similarity: Arc<dyn SimilarityProvider>,
    pub interactions: Arc<InteractionLog>,
    pub clock: Arc<dyn Clock>,
}

/// Personalized, cached job recommendations.
///
/// Per request: build context, retrieve candidate jobs, score, filter, rank,
/// paginate, write the cache, respond. A failure at any stage (including the
/// request deadline) fails the whole request and nothing is cached.
#[derive(Clone)]
pub struct RecommendationService {
    deps: RecommendationDeps,
    config: RecommendationConfig,
}

impl RecommendationService {
    pub fn new(deps: RecommendationDeps, config: RecommendationConfig) -> Self {
        Self { deps, config }
    }

    #[cfg(test)]
    pub fn cache(&self) -> &Arc<dyn CacheStore<RecommendationPage>> {
        &self.deps.cache
    }

    fn check_limit(&self, limit: usize) -> Result<(), AppError> {
        if limit == 0 || limit > self.config.max_recommendations {
            return Err(AppError::Validation(format!(
                "limit must be between 1 and {}, got {limit}",
                self.config.max_recommendations
            )));
        }
        Ok(())
    }

    fn require_id(value: &str, what: &str) -> Result<(), AppError> {
        if value.trim().is_empty() {
            return Err(AppError::InvalidInput(format!("{what} is required")));
        }
        Ok(())
    }

    pub async fn get_recommendations(
        &self,
        user_id: &str,
        request: &RecommendationRequest,
    ) -> Result<RecommendationPage, AppError> {
        Self::require_id(user_id, "user_id")?;
        self.check_limit(request.limit)?;
        if request.page == 0 {
            return Err(AppError::Validation("page is 1-based".to_string()));
        }

        let key = CacheKey::for_request(user_id, request)?;
        if let Some(hit) = self.deps.cache.get(&key) {
            debug!(user_id, "recommendation cache hit");
            return Ok(hit);
        }
        debug!(user_id, "recommendation cache miss");
        // read before any store access; an invalidation after this point
        // keeps the result out of the cache
        let generation = self.deps.cache.generation(user_id);

        let budget = request
            .timeout_ms
            .map(Duration::from_millis)
            .unwrap_or(self.config.request_timeout);
        let deadline = Instant::now() + budget;
        let (page, ranked_ids) =
            tokio::time::timeout_at(deadline, self.compute(user_id, request, deadline))
                .await
                .map_err(|_| AppError::Timeout(budget.as_millis() as u64))??;

        self.deps
            .cache
            .set_if_generation(key, page.clone(), self.config.cache_ttl, generation);
        self.deps.interactions.record_recommended(user_id);
        self.publish_generated(user_id, &page, ranked_ids);

        info!(
            user_id,
            total = page.total,
            returned = page.items.len(),
            "recommendations generated"
        );
        Ok(page)
    }

    async fn compute(
        &self,
        user_id: &str,
        request: &RecommendationRequest,
        deadline: Instant,
    ) -> Result<(RecommendationPage, Vec<String>), AppError> {
        // BUILD_CONTEXT
        let (profile, preferences, applied) = tokio::try_join!(
            self.deps.profiles.get_candidate_profile(user_id),
            self.deps.preferences.get_user_preferences(user_id),
            self.deps.profiles.get_applied_job_ids(user_id),
        )?;
        let profile = profile
            .ok_or_else(|| AppError::NotFound(format!("No profile for user {user_id}")))?;
        let ctx = RecommendationContext::new(
            user_id,
            profile,
            preferences.as_ref(),
            applied,
            self.deps.clock.now(),
        );

        // RETRIEVE_CANDIDATES
        let criteria = ctx.job_criteria(&request.filters, self.config.candidate_pool);
        let jobs: Vec<JobProfile> = self
            .deps
            .profiles
            .get_jobs_matching(&criteria)
            .await?
            .into_iter()
            .filter(|j| matches_skill_filter(&request.filters, j))
            .collect();
        debug!(user_id = %ctx.user_id, pool = jobs.len(), "candidate jobs retrieved");

        // SCORE
        let jobs: Arc<[JobProfile]> = jobs.into();
        let results = batch_calculate_matches(
            self.deps.scorer.clone(),
            Arc::from(vec![ctx.profile]),
            jobs.clone(),
            BatchOptions {
                max_workers: self.config.scoring_workers,
                timeout: deadline.saturating_duration_since(Instant::now()),
            },
        )
        .await?;

        // FILTER
        let threshold = self.config.min_score_threshold;
        let mut ranked: Vec<Ranked> = jobs
            .iter()
            .cloned()
            .zip(results)
            .map(|(job, result)| Ranked::new(job, result))
            .filter(|r| r.score >= threshold)
            .collect();

        // RANK
        if self.config.collaborative_boost && !ranked.is_empty() {
            let ids: Vec<String> = ranked.iter().map(|r| r.job.id.clone()).collect();
            let affinities = self.deps.similarity.affinities(user_id, &ids);
            apply_boosts(&mut ranked, &affinities);
        }
        sort_ranked(&mut ranked, request.sort);

        // PAGINATE
        let ranked_ids: Vec<String> = ranked.iter().map(|r| r.job.id.clone()).collect();
        let all: Vec<JobRecommendation> =
            ranked.into_iter().map(Ranked::into_recommendation).collect();
        Ok((
            PaginatedResponse::from_ranked(all, request.page, request.limit),
            ranked_ids,
        ))
    }

    fn publish_generated(&self, user_id: &str, page: &RecommendationPage, job_ids: Vec<String>) {
        let event = DomainEvent::RecommendationGenerated(RecommendationGenerated {
            user_id: user_id.to_string(),
            job_ids,
            total: page.total,
            generated_at: self.deps.clock.now(),
        });
        let publisher = self.deps.publisher.clone();
        tokio::spawn(async move {
            if let Err(e) = publisher.publish(&event).await {
                warn!("Failed to publish {}: {e}", event.channel());
            }
        });
    }

    /// Jobs whose title and description resemble `job_id`'s, most similar first.
    /// Independent of the requesting user's profile.
    pub async fn get_similar_jobs(
        &self,
        job_id: &str,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<SimilarJob>, AppError> {
        Self::require_id(job_id, "job_id")?;
        Self::require_id(user_id, "user_id")?;
        self.check_limit(limit)?;

        let reference = self
            .deps
            .profiles
            .get_job(job_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Job {job_id} not found")))?;

        let mut criteria = JobCriteria::open_at(self.deps.clock.now(), self.config.candidate_pool);
        criteria.exclude_job_ids = HashSet::from([reference.id.clone()]);
        let pool = self.deps.profiles.get_jobs_matching(&criteria).await?;

        let title = tokenize(&reference.title);
        let description = tokenize(&reference.description);
        let mut similar: Vec<(f64, JobProfile)> = pool
            .into_iter()
            .map(|job| {
                let s = TITLE_WEIGHT * jaccard(&title, &tokenize(&job.title))
                    + DESCRIPTION_WEIGHT * jaccard(&description, &tokenize(&job.description));
                (s, job)
            })
            .filter(|(s, _)| *s >= MIN_SIMILARITY)
            .collect();
        similar.sort_by(|(sa, a), (sb, b)| {
            sb.total_cmp(sa)
                .then_with(|| b.posted_at.cmp(&a.posted_at))
                .then_with(|| a.id.cmp(&b.id))
        });
        similar.truncate(limit);
        debug!(job_id, user_id, found = similar.len(), "similar jobs");

        Ok(similar
            .into_iter()
            .map(|(similarity, job)| SimilarJob {
                job: JobSummary::from(&job),
                similarity,
            })
            .collect())
    }

    /// Most-applied-to open jobs posted within `window`.
    pub async fn get_trending_jobs(
        &self,
        user_id: &str,
        limit: usize,
        window: Duration,
    ) -> Result<Vec<TrendingJob>, AppError> {
        Self::require_id(user_id, "user_id")?;
        self.check_limit(limit)?;
        let window = chrono::Duration::from_std(window)
            .map_err(|_| AppError::InvalidInput("time window is too large".to_string()))?;

        let now = self.deps.clock.now();
        let mut criteria = JobCriteria::open_at(now, self.config.candidate_pool);
        criteria.posted_since = Some(now - window);
        let mut jobs = self.deps.profiles.get_jobs_matching(&criteria).await?;

        jobs.sort_by(|a, b| {
            b.application_count
                .cmp(&a.application_count)
                .then_with(|| b.posted_at.cmp(&a.posted_at))
                .then_with(|| a.id.cmp(&b.id))
        });
        jobs.truncate(limit);

        Ok(jobs
            .iter()
            .map(|job| TrendingJob {
                job: JobSummary::from(job),
                application_count: job.application_count,
                trend_score: (job.application_count as f64 / TRENDING_DIVISOR).min(1.0),
            })
            .collect())
    }
}
