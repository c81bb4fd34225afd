//! Read-only access to profiles, jobs, applications and preferences.
//!
//! The recommendation core only sees these traits; `postgres` is the
//! production adapter.

#[cfg(test)]
pub mod memory;
pub mod postgres;

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::errors::AppError;
use crate::models::{
    CandidateProfile, ExperienceLevel, JobProfile, JobType, UserPreferences,
};

/// Predicates for pulling the candidate job pool. Every populated field narrows.
#[derive(Debug, Clone)]
pub struct JobCriteria {
    /// Jobs must be published and unexpired at this instant.
    pub now: DateTime<Utc>,
    pub posted_since: Option<DateTime<Utc>>,
    /// Substring match against the job location.
    pub locations: Vec<String>,
    /// With `locations` set, remote jobs still qualify.
    pub include_remote: bool,
    pub remote_only: bool,
    /// Jobs whose advertised maximum is below this are dropped. Jobs without a salary stay.
    pub salary_min: Option<u32>,
    pub industries: Vec<String>,
    pub job_types: Vec<JobType>,
    pub experience_levels: Vec<ExperienceLevel>,
    pub exclude_job_ids: HashSet<String>,
    pub limit: usize,
}

impl JobCriteria {
    pub fn open_at(now: DateTime<Utc>, limit: usize) -> Self {
        Self {
            now,
            posted_since: None,
            locations: Vec::new(),
            include_remote: true,
            remote_only: false,
            salary_min: None,
            industries: Vec::new(),
            job_types: Vec::new(),
            experience_levels: Vec::new(),
            exclude_job_ids: HashSet::new(),
            limit,
        }
    }

    /// In-process form of the predicates; stores that cannot push them down
    /// filter with this.
    pub fn matches(&self, job: &JobProfile) -> bool {
        if !job.is_open(self.now) || self.exclude_job_ids.contains(&job.id) {
            return false;
        }
        if self.posted_since.is_some_and(|since| job.posted_at < since) {
            return false;
        }
        if self.remote_only && !job.is_remote {
            return false;
        }
        if !self.locations.is_empty() {
            let location = job.location.to_lowercase();
            let near = self
                .locations
                .iter()
                .any(|l| location.contains(&l.trim().to_lowercase()));
            if !near && !(self.include_remote && job.is_remote) {
                return false;
            }
        }
        if let (Some(min), Some(salary)) = (self.salary_min, job.salary.as_ref()) {
            if salary.max < min {
                return false;
            }
        }
        if !self.industries.is_empty() {
            let industry = job.company.industry.as_deref().unwrap_or("").to_lowercase();
            if !self
                .industries
                .iter()
                .any(|i| industry.contains(&i.trim().to_lowercase()))
            {
                return false;
            }
        }
        if !self.job_types.is_empty() && !self.job_types.contains(&job.job_type) {
            return false;
        }
        if !self.experience_levels.is_empty() {
            if let Some(level) = job.experience_level {
                if !self.experience_levels.contains(&level) {
                    return false;
                }
            }
        }
        true
    }
}

#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// `None` when the user has no profile.
    async fn get_candidate_profile(&self, user_id: &str)
        -> Result<Option<CandidateProfile>, AppError>;

    /// Newest first, at most `criteria.limit` jobs.
    async fn get_jobs_matching(&self, criteria: &JobCriteria) -> Result<Vec<JobProfile>, AppError>;

    async fn get_applied_job_ids(&self, user_id: &str) -> Result<HashSet<String>, AppError>;

    async fn get_job(&self, job_id: &str) -> Result<Option<JobProfile>, AppError>;
}

#[async_trait]
pub trait PreferencesStore: Send + Sync {
    async fn get_user_preferences(&self, user_id: &str)
        -> Result<Option<UserPreferences>, AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SalaryRange;
    use crate::test_support::{fixed_now, job, scenario_job};

    #[test]
    fn test_closed_and_expired_jobs_never_match() {
        let c = JobCriteria::open_at(fixed_now(), 10);
        let mut closed = job("j1", "Engineer", 1);
        closed.status = crate::models::JobStatus::Closed;
        let mut expired = job("j2", "Engineer", 1);
        expired.expires_at = Some(fixed_now() - chrono::Duration::hours(1));
        assert!(!c.matches(&closed));
        assert!(!c.matches(&expired));
        assert!(c.matches(&job("j3", "Engineer", 1)));
    }

    #[test]
    fn test_location_filter_keeps_remote_jobs() {
        let mut c = JobCriteria::open_at(fixed_now(), 10);
        c.locations = vec!["Munich".into()];
        assert!(!c.matches(&job("berlin", "Engineer", 1)));
        assert!(c.matches(&scenario_job()));
        c.include_remote = false;
        assert!(!c.matches(&scenario_job()));
    }

    #[test]
    fn test_salary_floor_and_exclusions() {
        let mut c = JobCriteria::open_at(fixed_now(), 10);
        c.salary_min = Some(175_000);
        assert!(!c.matches(&scenario_job()));
        let mut unpaid = job("j-none", "Engineer", 1);
        unpaid.salary = None;
        assert!(c.matches(&unpaid));

        c.salary_min = Some(100_000);
        c.exclude_job_ids.insert("job-scenario".into());
        assert!(!c.matches(&scenario_job()));

        let mut cheap = scenario_job();
        cheap.id = "cheap".into();
        cheap.salary = Some(SalaryRange::new(50_000, 90_000));
        assert!(!c.matches(&cheap));
    }

    #[test]
    fn test_posted_since_window() {
        let mut c = JobCriteria::open_at(fixed_now(), 10);
        c.posted_since = Some(fixed_now() - chrono::Duration::days(7));
        assert!(c.matches(&job("fresh", "Engineer", 2)));
        assert!(!c.matches(&job("stale", "Engineer", 8)));
    }
}
