//! PostgreSQL adapter for the profile and preferences stores.
//!
//! Tables (read-only from here):
//! - `candidate_profiles`: scalar columns plus JSONB `personal_info`,
//!   `experience`, `education`, `skills`, `projects`, `job_preferences`
//! - `jobs`: JSONB `company`, `required_skills`, `education`; text enums
//!   `experience_level`, `job_type`, `status`; `salary_min`/`salary_max`
//! - `applications (user_id, job_id)`
//! - `user_preferences`: `salary_min`/`salary_max`, `locations text[]`,
//!   `industries text[]`, `remote_only`
//!
//! JSONB and text enums are decoded into the tagged model types here. A row
//! that does not decode is logged and skipped rather than failing the query.

use std::collections::HashSet;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::Value;
use sqlx::{FromRow, PgPool};
use tracing::{debug, warn};

use crate::errors::AppError;
use crate::models::{
    CandidateProfile, CompanyInfo, EducationRequirement, ExperienceLevel, JobProfile, JobStatus,
    JobType, RequiredSkill, SalaryRange, UserPreferences,
};
use crate::store::{JobCriteria, PreferencesStore, ProfileStore};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct CandidateRow {
    id: String,
    user_id: String,
    personal_info: Value,
    experience: Value,
    education: Value,
    skills: Value,
    projects: Value,
    job_preferences: Value,
    completeness: i16,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct JobRow {
    id: String,
    title: String,
    description: String,
    company: Value,
    required_skills: Value,
    experience_level: Option<String>,
    min_years_experience: Option<f64>,
    education: Option<Value>,
    salary_min: Option<i32>,
    salary_max: Option<i32>,
    salary_currency: Option<String>,
    location: String,
    is_remote: bool,
    job_type: String,
    status: String,
    posted_at: DateTime<Utc>,
    expires_at: Option<DateTime<Utc>>,
    application_count: i32,
}

#[derive(Debug, FromRow)]
struct PreferencesRow {
    user_id: String,
    salary_min: Option<i32>,
    salary_max: Option<i32>,
    locations: Vec<String>,
    industries: Vec<String>,
    remote_only: bool,
}

fn from_json<T: DeserializeOwned>(value: Value, column: &str) -> Result<T> {
    serde_json::from_value(value).with_context(|| format!("column '{column}' does not decode"))
}

/// Text enum columns use the same snake_case names as the JSON encoding.
fn from_text<T: DeserializeOwned>(text: &str, column: &str) -> Result<T> {
    from_json(Value::String(text.to_string()), column)
}

fn salary_range(
    min: Option<i32>,
    max: Option<i32>,
    currency: Option<String>,
) -> Result<Option<SalaryRange>> {
    let (Some(min), Some(max)) = (min, max) else {
        return Ok(None);
    };
    let mut range = SalaryRange::new(
        u32::try_from(min).context("negative salary_min")?,
        u32::try_from(max).context("negative salary_max")?,
    );
    if !range.is_valid() {
        anyhow::bail!("salary_min {min} exceeds salary_max {max}");
    }
    if let Some(currency) = currency {
        range.currency = currency;
    }
    Ok(Some(range))
}

impl TryFrom<CandidateRow> for CandidateProfile {
    type Error = anyhow::Error;

    fn try_from(row: CandidateRow) -> Result<Self> {
        Ok(CandidateProfile {
            id: row.id,
            user_id: row.user_id,
            personal_info: from_json(row.personal_info, "personal_info")?,
            experience: from_json(row.experience, "experience")?,
            education: from_json(row.education, "education")?,
            skills: from_json(row.skills, "skills")?,
            projects: from_json(row.projects, "projects")?,
            job_preferences: from_json(row.job_preferences, "job_preferences")?,
            completeness: row.completeness.clamp(0, 100) as u8,
            last_updated: row.updated_at,
        })
    }
}

impl TryFrom<JobRow> for JobProfile {
    type Error = anyhow::Error;

    fn try_from(row: JobRow) -> Result<Self> {
        let company: CompanyInfo = from_json(row.company, "company")?;
        let required_skills: Vec<RequiredSkill> = from_json(row.required_skills, "required_skills")?;
        let education: Option<EducationRequirement> = row
            .education
            .map(|v| from_json(v, "education"))
            .transpose()?;
        let experience_level: Option<ExperienceLevel> = row
            .experience_level
            .as_deref()
            .map(|s| from_text(s, "experience_level"))
            .transpose()?;
        let job_type: JobType = from_text(&row.job_type, "job_type")?;
        let status: JobStatus = from_text(&row.status, "status")?;

        Ok(JobProfile {
            id: row.id,
            title: row.title,
            description: row.description,
            company,
            required_skills,
            experience_level,
            min_years_experience: row.min_years_experience,
            education,
            salary: salary_range(row.salary_min, row.salary_max, row.salary_currency)?,
            location: row.location,
            is_remote: row.is_remote,
            job_type,
            status,
            posted_at: row.posted_at,
            expires_at: row.expires_at,
            application_count: row.application_count.max(0) as u32,
        })
    }
}

impl TryFrom<PreferencesRow> for UserPreferences {
    type Error = anyhow::Error;

    fn try_from(row: PreferencesRow) -> Result<Self> {
        Ok(UserPreferences {
            user_id: row.user_id,
            salary: salary_range(row.salary_min, row.salary_max, None)?,
            locations: row.locations,
            industries: row.industries,
            remote_only: row.remote_only,
        })
    }
}

/// Decodes rows, dropping the ones that fail with a warning.
fn decode_rows<R, T>(rows: Vec<R>, what: &str) -> Vec<T>
where
    T: TryFrom<R, Error = anyhow::Error>,
{
    rows.into_iter()
        .filter_map(|row| match T::try_from(row) {
            Ok(v) => Some(v),
            Err(e) => {
                warn!("Skipping undecodable {what} row: {e:#}");
                None
            }
        })
        .collect()
}

fn lowered(values: &[String]) -> Vec<String> {
    values.iter().map(|v| v.trim().to_lowercase()).collect()
}

fn enum_names<T: serde::Serialize>(values: &[T]) -> Vec<String> {
    values
        .iter()
        .filter_map(|v| match serde_json::to_value(v) {
            Ok(Value::String(s)) => Some(s),
            _ => None,
        })
        .collect()
}

#[async_trait]
impl ProfileStore for PgStore {
    async fn get_candidate_profile(
        &self,
        user_id: &str,
    ) -> Result<Option<CandidateProfile>, AppError> {
        let row: Option<CandidateRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, personal_info, experience, education, skills, projects,
                   job_preferences, completeness, updated_at
            FROM candidate_profiles
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            None => Ok(None),
            Some(row) => CandidateProfile::try_from(row).map(Some).map_err(|e| {
                warn!("Profile for user {user_id} does not decode: {e:#}");
                AppError::Validation(format!("stored profile for user {user_id} is malformed"))
            }),
        }
    }

    async fn get_jobs_matching(&self, criteria: &JobCriteria) -> Result<Vec<JobProfile>, AppError> {
        let exclude: Vec<String> = criteria.exclude_job_ids.iter().cloned().collect();
        let salary_min = criteria.salary_min.map(|s| s.min(i32::MAX as u32) as i32);

        let rows: Vec<JobRow> = sqlx::query_as(
            r#"
            SELECT id, title, description, company, required_skills, experience_level,
                   min_years_experience, education, salary_min, salary_max, salary_currency,
                   location, is_remote, job_type, status, posted_at, expires_at, application_count
            FROM jobs
            WHERE status = 'published'
              AND (expires_at IS NULL OR expires_at > $1)
              AND ($2::timestamptz IS NULL OR posted_at >= $2)
              AND NOT (id = ANY($3))
              AND (NOT $4 OR is_remote)
              AND (cardinality($5::text[]) = 0
                   OR ($6 AND is_remote)
                   OR EXISTS (SELECT 1 FROM unnest($5::text[]) loc
                              WHERE lower(location) LIKE '%' || loc || '%'))
              AND ($7::int IS NULL OR salary_max IS NULL OR salary_max >= $7)
              AND (cardinality($8::text[]) = 0
                   OR EXISTS (SELECT 1 FROM unnest($8::text[]) ind
                              WHERE lower(company->>'industry') LIKE '%' || ind || '%'))
              AND (cardinality($9::text[]) = 0 OR job_type = ANY($9))
              AND (cardinality($10::text[]) = 0
                   OR experience_level IS NULL
                   OR experience_level = ANY($10))
            ORDER BY posted_at DESC, id ASC
            LIMIT $11
            "#,
        )
        .bind(criteria.now)
        .bind(criteria.posted_since)
        .bind(&exclude)
        .bind(criteria.remote_only)
        .bind(lowered(&criteria.locations))
        .bind(criteria.include_remote)
        .bind(salary_min)
        .bind(lowered(&criteria.industries))
        .bind(enum_names(&criteria.job_types))
        .bind(enum_names(&criteria.experience_levels))
        .bind(criteria.limit as i64)
        .fetch_all(&self.pool)
        .await?;

        let fetched = rows.len();
        let jobs: Vec<JobProfile> = decode_rows(rows, "job");
        debug!(fetched, decoded = jobs.len(), "job pool loaded");
        Ok(jobs)
    }

    async fn get_applied_job_ids(&self, user_id: &str) -> Result<HashSet<String>, AppError> {
        let ids: Vec<String> =
            sqlx::query_scalar("SELECT job_id FROM applications WHERE user_id = $1")
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?;
        Ok(ids.into_iter().collect())
    }

    async fn get_job(&self, job_id: &str) -> Result<Option<JobProfile>, AppError> {
        let rows: Vec<JobRow> = sqlx::query_as(
            r#"
            SELECT id, title, description, company, required_skills, experience_level,
                   min_years_experience, education, salary_min, salary_max, salary_currency,
                   location, is_remote, job_type, status, posted_at, expires_at, application_count
            FROM jobs
            WHERE id = $1
            "#,
        )
        .bind(job_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(decode_rows(rows, "job").into_iter().next())
    }
}

#[async_trait]
impl PreferencesStore for PgStore {
    async fn get_user_preferences(
        &self,
        user_id: &str,
    ) -> Result<Option<UserPreferences>, AppError> {
        let rows: Vec<PreferencesRow> = sqlx::query_as(
            r#"
            SELECT user_id, salary_min, salary_max, locations, industries, remote_only
            FROM user_preferences
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(decode_rows(rows, "preferences").into_iter().next())
    }
}
