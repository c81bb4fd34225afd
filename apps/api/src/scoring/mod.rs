//! Scoring engine: weighted multi-factor match between one candidate and one job.
//!
//! Default: `WeightedMatchScorer` (pure-Rust, synchronous, deterministic given
//! its clock). Callers hold an `Arc<dyn MatchScorer>` so the backend can be
//! swapped without touching the recommendation pipeline.
//!
//! Scale: every dimension is computed on 0–1, the composite is the weighted sum
//! on 0–1, and everything exposed in `ScoreBreakdown` / `MatchResult::score`
//! is reported on 0–100.

pub mod batch;
pub mod dimensions;
pub mod explanation;
pub mod text;
pub mod weights;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::errors::AppError;
use crate::models::{CandidateProfile, JobProfile};

pub use batch::{batch_calculate_matches, BatchOptions};
pub use explanation::MatchExplanation;
pub use weights::ScoringWeights;

const CONFIDENCE_FLOOR: f64 = 0.5;
/// Largest possible variance of values confined to [0, 1].
const MAX_VARIANCE: f64 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Skills,
    Experience,
    Education,
    Location,
    Salary,
    Preferences,
    CulturalFit,
}

impl Dimension {
    pub fn weight(self, weights: &ScoringWeights) -> f64 {
        match self {
            Dimension::Skills => weights.skills,
            Dimension::Experience => weights.experience,
            Dimension::Education => weights.education,
            Dimension::Location => weights.location,
            Dimension::Salary => weights.salary,
            Dimension::Preferences => weights.preferences,
            Dimension::CulturalFit => weights.cultural_fit,
        }
    }
}

/// Sub-scores and composite, all on 0–100.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub skills: f64,
    pub experience: f64,
    pub education: f64,
    pub location: f64,
    pub salary: f64,
    pub preferences: f64,
    pub cultural_fit: f64,
    /// Σ(sub-score × weight)
    pub overall_score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    Perfect,
    Strong,
    Moderate,
    Weak,
}

impl MatchType {
    /// Buckets a normalized (0–1) score.
    pub fn from_normalized(score: f64) -> Self {
        match score {
            s if s >= 0.9 => MatchType::Perfect,
            s if s >= 0.7 => MatchType::Strong,
            s if s >= 0.5 => MatchType::Moderate,
            _ => MatchType::Weak,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub candidate_id: String,
    pub job_id: String,
    /// 0 – 100
    pub score: f64,
    pub match_type: MatchType,
    /// 0.5 – 1.0
    pub confidence: f64,
    pub breakdown: ScoreBreakdown,
    pub explanation: MatchExplanation,
    pub calculated_at: DateTime<Utc>,
}

/// The match scorer trait. Implement this to swap scoring backends.
pub trait MatchScorer: Send + Sync {
    fn calculate_match(
        &self,
        candidate: &CandidateProfile,
        job: &JobProfile,
    ) -> Result<MatchResult, AppError>;
}

/// Weighted linear combination of seven dimension scores.
#[derive(Clone)]
pub struct WeightedMatchScorer {
    weights: ScoringWeights,
    clock: Arc<dyn Clock>,
}

impl WeightedMatchScorer {
    pub fn new(weights: ScoringWeights, clock: Arc<dyn Clock>) -> Result<Self, AppError> {
        weights.validate()?;
        Ok(Self { weights, clock })
    }

    #[cfg(test)]
    pub fn with_default_weights(clock: Arc<dyn Clock>) -> Self {
        Self {
            weights: ScoringWeights::default(),
            clock,
        }
    }
}

impl MatchScorer for WeightedMatchScorer {
    fn calculate_match(
        &self,
        candidate: &CandidateProfile,
        job: &JobProfile,
    ) -> Result<MatchResult, AppError> {
        if candidate.id.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "candidate profile has no identifier".to_string(),
            ));
        }
        if job.id.trim().is_empty() {
            return Err(AppError::InvalidInput("job has no identifier".to_string()));
        }

        let now = self.clock.now();
        let prefs = &candidate.job_preferences;

        let skills = dimensions::skills_match(candidate, job);
        let subscores = [
            (Dimension::Skills, skills.score),
            (
                Dimension::Experience,
                dimensions::experience_match(candidate, job, now.date_naive()),
            ),
            (Dimension::Education, dimensions::education_match(candidate, job)),
            (Dimension::Location, dimensions::location_match(prefs, job)),
            (
                Dimension::Salary,
                dimensions::salary_match(prefs.salary.as_ref(), job.salary.as_ref()),
            ),
            (Dimension::Preferences, dimensions::preferences_match(prefs, job)),
            (
                Dimension::CulturalFit,
                dimensions::cultural_fit_match(&prefs.values, &job.company),
            ),
        ];

        let overall: f64 = subscores
            .iter()
            .map(|(d, s)| s * d.weight(&self.weights))
            .sum::<f64>()
            .clamp(0.0, 1.0);

        let breakdown = breakdown_from(&subscores, overall);
        let explanation = explanation::build_explanation(&subscores, &self.weights, &skills);

        Ok(MatchResult {
            candidate_id: candidate.id.clone(),
            job_id: job.id.clone(),
            score: breakdown.overall_score,
            match_type: MatchType::from_normalized(overall),
            confidence: confidence(&subscores, &self.weights),
            breakdown,
            explanation,
            calculated_at: now,
        })
    }
}

fn to_percent(normalized: f64) -> f64 {
    (normalized.clamp(0.0, 1.0) * 10_000.0).round() / 100.0
}

fn breakdown_from(subscores: &[(Dimension, f64)], overall: f64) -> ScoreBreakdown {
    let mut breakdown = ScoreBreakdown {
        overall_score: to_percent(overall),
        ..Default::default()
    };
    for &(dimension, score) in subscores {
        let pct = to_percent(score);
        match dimension {
            Dimension::Skills => breakdown.skills = pct,
            Dimension::Experience => breakdown.experience = pct,
            Dimension::Education => breakdown.education = pct,
            Dimension::Location => breakdown.location = pct,
            Dimension::Salary => breakdown.salary = pct,
            Dimension::Preferences => breakdown.preferences = pct,
            Dimension::CulturalFit => breakdown.cultural_fit = pct,
        }
    }
    breakdown
}

/// Agreement between the weighted dimensions: `1 − 0.5 × variance / 0.25`,
/// clamped to [0.5, 1.0].
fn confidence(subscores: &[(Dimension, f64)], weights: &ScoringWeights) -> f64 {
    let values: Vec<f64> = subscores
        .iter()
        .filter(|(d, _)| d.weight(weights) > 0.0)
        .map(|(_, s)| *s)
        .collect();
    if values.len() < 2 {
        return 1.0;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    (1.0 - (1.0 - CONFIDENCE_FLOOR) * (variance / MAX_VARIANCE)).clamp(CONFIDENCE_FLOOR, 1.0)
}
