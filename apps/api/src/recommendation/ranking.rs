use std::cmp::Ordering;
use std::collections::HashMap;

use crate::models::{JobProfile, JobRecommendation, JobSummary, RecommendationSort};
use crate::scoring::{MatchResult, MatchType};

/// Share of the remaining headroom a full-affinity job can gain.
pub const BOOST_FACTOR: f64 = 0.2;

/// A scored job on its way to becoming a recommendation.
#[derive(Debug, Clone)]
pub struct Ranked {
    pub job: JobProfile,
    pub result: MatchResult,
    /// Normalized (0–1) score after boosting.
    pub score: f64,
}

impl Ranked {
    pub fn new(job: JobProfile, result: MatchResult) -> Self {
        let score = result.score / 100.0;
        Self { job, result, score }
    }

    pub fn into_recommendation(self) -> JobRecommendation {
        let match_score = (self.score * 10_000.0).round() / 100.0;
        let boost = ((match_score - self.result.breakdown.overall_score) * 100.0).round() / 100.0;
        JobRecommendation {
            job: JobSummary::from(&self.job),
            match_score,
            boost: boost.max(0.0),
            match_type: MatchType::from_normalized(self.score),
            match_confidence: self.result.confidence,
            match_details: self.result.breakdown,
            explanation: self.result.explanation,
            last_matched: self.result.calculated_at,
        }
    }
}

/// `score + 0.2 × affinity × (1 − score)`: moves a score towards 1 without reaching past it.
pub fn boost(score: f64, affinity: f64) -> f64 {
    let score = score.clamp(0.0, 1.0);
    (score + BOOST_FACTOR * affinity.clamp(0.0, 1.0) * (1.0 - score)).min(1.0)
}

pub fn apply_boosts(items: &mut [Ranked], affinities: &HashMap<String, f64>) {
    for item in items.iter_mut() {
        if let Some(affinity) = affinities.get(&item.job.id) {
            item.score = boost(item.score, *affinity);
        }
    }
}

/// Score desc, newest first, then job id.
fn by_score(a: &Ranked, b: &Ranked) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| b.job.posted_at.cmp(&a.job.posted_at))
        .then_with(|| a.job.id.cmp(&b.job.id))
}

pub fn sort_ranked(items: &mut [Ranked], sort: RecommendationSort) {
    match sort {
        RecommendationSort::Score => items.sort_by(by_score),
        RecommendationSort::Recent => items.sort_by(|a, b| {
            b.job
                .posted_at
                .cmp(&a.job.posted_at)
                .then_with(|| by_score(a, b))
        }),
        RecommendationSort::Salary => items.sort_by(|a, b| {
            let pay = |r: &Ranked| r.job.salary.as_ref().map(|s| s.max);
            // undisclosed salaries last
            pay(b).cmp(&pay(a)).then_with(|| by_score(a, b))
        }),
    }
}
