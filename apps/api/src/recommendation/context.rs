use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::analyzer::skills::normalize_skill_name;
use crate::models::{CandidateProfile, JobProfile, RecommendationFilters, UserPreferences};
use crate::store::JobCriteria;

/// Everything the pipeline knows about the requesting user, assembled once
/// per request.
#[derive(Debug, Clone)]
pub struct RecommendationContext {
    pub user_id: String,
    /// Profile with the preferences store merged into `job_preferences`.
    pub profile: CandidateProfile,
    pub applied: HashSet<String>,
    pub now: DateTime<Utc>,
}

impl RecommendationContext {
    pub fn new(
        user_id: &str,
        mut profile: CandidateProfile,
        preferences: Option<&UserPreferences>,
        applied: HashSet<String>,
        now: DateTime<Utc>,
    ) -> Self {
        if let Some(prefs) = preferences {
            merge_preferences(&mut profile, prefs);
        }
        Self {
            user_id: user_id.to_string(),
            profile,
            applied,
            now,
        }
    }

    /// Store predicates for this user: caller filters first, then the user's
    /// declared location and remote preferences. Applied jobs are excluded.
    ///
    /// A "remote" location stands for remote jobs, never for location text.
    /// Asking for remote and nothing else restricts the pool to remote jobs.
    pub fn job_criteria(&self, filters: &RecommendationFilters, pool: usize) -> JobCriteria {
        let prefs = &self.profile.job_preferences;
        let mut criteria = JobCriteria::open_at(self.now, pool);

        let (places, wants_remote) = split_remote(&filters.locations);
        criteria.locations = if !filters.locations.is_empty() {
            places
        } else if prefs.willing_to_relocate {
            Vec::new()
        } else {
            split_remote(&prefs.locations).0
        };
        let remote_filter_only = wants_remote && criteria.locations.is_empty();
        criteria.include_remote = filters.remote_only || wants_remote || prefs.accepts_remote();
        criteria.remote_only = filters.remote_only || remote_filter_only || prefs.remote_only;
        criteria.salary_min = filters.salary_min;
        criteria.industries = filters.industries.clone();
        criteria.job_types = filters.job_types.clone();
        criteria.experience_levels = filters.experience_levels.clone();
        criteria.exclude_job_ids = self
            .applied
            .iter()
            .chain(filters.exclude_job_ids.iter())
            .cloned()
            .collect();
        criteria
    }
}

/// Concrete places, and whether any entry asked for remote work.
fn split_remote(locations: &[String]) -> (Vec<String>, bool) {
    let (remote, places): (Vec<&String>, Vec<&String>) = locations
        .iter()
        .partition(|l| l.trim().eq_ignore_ascii_case("remote"));
    (places.into_iter().cloned().collect(), !remote.is_empty())
}

/// Values from the preferences store win over the profile's own where set.
pub fn merge_preferences(profile: &mut CandidateProfile, prefs: &UserPreferences) {
    let target = &mut profile.job_preferences;
    if let Some(salary) = &prefs.salary {
        target.salary = Some(salary.clone());
    }
    if !prefs.locations.is_empty() {
        target.locations = prefs.locations.clone();
    }
    if !prefs.industries.is_empty() {
        target.industries = prefs.industries.clone();
    }
    target.remote_only |= prefs.remote_only;
}

/// `true` when `filters.skills` is empty or the job lists any of them.
pub fn matches_skill_filter(filters: &RecommendationFilters, job: &JobProfile) -> bool {
    if filters.skills.is_empty() {
        return true;
    }
    let wanted: HashSet<String> = filters.skills.iter().map(|s| normalize_skill_name(s)).collect();
    job.required_skills
        .iter()
        .any(|s| wanted.contains(&normalize_skill_name(&s.name)))
}
