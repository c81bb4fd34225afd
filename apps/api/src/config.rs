use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    pub port: u16,
    pub rust_log: String,
    pub recommendation: RecommendationConfig,
}

/// Tuning for the recommendation pipeline and its cache.
#[derive(Debug, Clone, PartialEq)]
pub struct RecommendationConfig {
    /// Largest accepted `limit` per request.
    pub max_recommendations: usize,
    /// Matches below this normalized (0–1) score are dropped.
    pub min_score_threshold: f64,
    pub cache_ttl: Duration,
    pub cache_capacity: usize,
    pub cache_shards: usize,
    pub cache_sweep_interval: Duration,
    pub request_timeout: Duration,
    pub scoring_workers: usize,
    /// Jobs pulled from the store per request before scoring.
    pub candidate_pool: usize,
    pub collaborative_boost: bool,
    /// Users whose applications are kept for collaborative boosting.
    pub interaction_capacity: usize,
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            max_recommendations: 50,
            min_score_threshold: 0.3,
            cache_ttl: Duration::from_secs(900),
            cache_capacity: 10_000,
            cache_shards: 16,
            cache_sweep_interval: Duration::from_secs(60),
            request_timeout: Duration::from_millis(5_000),
            scoring_workers: 4,
            candidate_pool: 500,
            collaborative_boost: true,
            interaction_capacity: 50_000,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            redis_url: require_env("REDIS_URL")?,
            port: env_or("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            recommendation: RecommendationConfig::from_env()?,
        })
    }
}

impl RecommendationConfig {
    pub fn from_env() -> Result<Self> {
        let d = Self::default();
        let cfg = Self {
            max_recommendations: env_or("REC_MAX_RECOMMENDATIONS", d.max_recommendations)?,
            min_score_threshold: env_or("REC_MIN_SCORE_THRESHOLD", d.min_score_threshold)?,
            cache_ttl: Duration::from_secs(env_or("REC_CACHE_TTL_SECS", d.cache_ttl.as_secs())?),
            cache_capacity: env_or("REC_CACHE_CAPACITY", d.cache_capacity)?,
            cache_shards: env_or("REC_CACHE_SHARDS", d.cache_shards)?,
            cache_sweep_interval: Duration::from_secs(env_or(
                "REC_CACHE_SWEEP_SECS",
                d.cache_sweep_interval.as_secs(),
            )?),
            request_timeout: Duration::from_millis(env_or(
                "REC_REQUEST_TIMEOUT_MS",
                d.request_timeout.as_millis() as u64,
            )?),
            scoring_workers: env_or("REC_SCORING_WORKERS", d.scoring_workers)?,
            candidate_pool: env_or("REC_CANDIDATE_POOL", d.candidate_pool)?,
            collaborative_boost: env_or("REC_COLLABORATIVE_BOOST", d.collaborative_boost)?,
            interaction_capacity: env_or("REC_INTERACTION_CAPACITY", d.interaction_capacity)?,
        };
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<()> {
        anyhow::ensure!(self.max_recommendations > 0, "REC_MAX_RECOMMENDATIONS must be positive");
        anyhow::ensure!(
            (0.0..=1.0).contains(&self.min_score_threshold),
            "REC_MIN_SCORE_THRESHOLD must be within [0, 1]"
        );
        anyhow::ensure!(self.cache_shards > 0, "REC_CACHE_SHARDS must be positive");
        anyhow::ensure!(self.scoring_workers > 0, "REC_SCORING_WORKERS must be positive");
        anyhow::ensure!(
            self.interaction_capacity > 0,
            "REC_INTERACTION_CAPACITY must be positive"
        );
        anyhow::ensure!(
            !self.cache_sweep_interval.is_zero(),
            "REC_CACHE_SWEEP_SECS must be positive"
        );
        Ok(())
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value '{raw}'")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let d = RecommendationConfig::default();
        assert!(d.validate().is_ok());
        assert_eq!(d.max_recommendations, 50);
        assert_eq!(d.cache_ttl, Duration::from_secs(900));
    }

    #[test]
    fn test_out_of_range_threshold_rejected() {
        let cfg = RecommendationConfig {
            min_score_threshold: 1.5,
            ..RecommendationConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_env_or_parses_and_falls_back() {
        std::env::set_var("JOBMATCH_TEST_WORKERS", "8");
        assert_eq!(env_or("JOBMATCH_TEST_WORKERS", 4usize).unwrap(), 8);
        std::env::set_var("JOBMATCH_TEST_WORKERS", "many");
        assert!(env_or("JOBMATCH_TEST_WORKERS", 4usize).is_err());
        std::env::remove_var("JOBMATCH_TEST_WORKERS");
        assert_eq!(env_or("JOBMATCH_TEST_WORKERS", 4usize).unwrap(), 4);
    }
}
