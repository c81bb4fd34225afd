//! In-process store used as a test fixture. Counts every call so tests can
//! assert that rejected requests never reached the store.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;

use crate::errors::AppError;
use crate::models::{CandidateProfile, JobProfile, UserPreferences};
use crate::store::{JobCriteria, PreferencesStore, ProfileStore};

#[derive(Default)]
pub struct InMemoryStore {
    profiles: RwLock<HashMap<String, CandidateProfile>>,
    jobs: RwLock<Vec<JobProfile>>,
    applied: RwLock<HashMap<String, HashSet<String>>>,
    preferences: RwLock<HashMap<String, UserPreferences>>,
    calls: AtomicUsize,
    unavailable: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profile(self, profile: CandidateProfile) -> Self {
        self.profiles
            .write()
            .unwrap()
            .insert(profile.user_id.clone(), profile);
        self
    }

    pub fn with_jobs(self, jobs: impl IntoIterator<Item = JobProfile>) -> Self {
        self.jobs.write().unwrap().extend(jobs);
        self
    }

    pub fn with_preferences(self, prefs: UserPreferences) -> Self {
        self.preferences
            .write()
            .unwrap()
            .insert(prefs.user_id.clone(), prefs);
        self
    }

    pub fn mark_applied(&self, user_id: &str, job_id: &str) {
        self.applied
            .write()
            .unwrap()
            .entry(user_id.to_string())
            .or_default()
            .insert(job_id.to_string());
    }

    pub fn replace_profile(&self, profile: CandidateProfile) {
        self.profiles
            .write()
            .unwrap()
            .insert(profile.user_id.clone(), profile);
    }

    /// Makes every subsequent call fail with `TransientStore`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn enter(&self) -> Result<(), AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AppError::TransientStore("in-memory store offline".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl ProfileStore for InMemoryStore {
    async fn get_candidate_profile(
        &self,
        user_id: &str,
    ) -> Result<Option<CandidateProfile>, AppError> {
        self.enter()?;
        Ok(self.profiles.read().unwrap().get(user_id).cloned())
    }

    async fn get_jobs_matching(&self, criteria: &JobCriteria) -> Result<Vec<JobProfile>, AppError> {
        self.enter()?;
        let mut jobs: Vec<JobProfile> = self
            .jobs
            .read()
            .unwrap()
            .iter()
            .filter(|j| criteria.matches(j))
            .cloned()
            .collect();
        jobs.sort_by(|a, b| b.posted_at.cmp(&a.posted_at).then_with(|| a.id.cmp(&b.id)));
        jobs.truncate(criteria.limit);
        Ok(jobs)
    }

    async fn get_applied_job_ids(&self, user_id: &str) -> Result<HashSet<String>, AppError> {
        self.enter()?;
        Ok(self
            .applied
            .read()
            .unwrap()
            .get(user_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_job(&self, job_id: &str) -> Result<Option<JobProfile>, AppError> {
        self.enter()?;
        Ok(self
            .jobs
            .read()
            .unwrap()
            .iter()
            .find(|j| j.id == job_id)
            .cloned())
    }
}

#[async_trait]
impl PreferencesStore for InMemoryStore {
    async fn get_user_preferences(
        &self,
        user_id: &str,
    ) -> Result<Option<UserPreferences>, AppError> {
        self.enter()?;
        Ok(self.preferences.read().unwrap().get(user_id).cloned())
    }
}
