use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::candidate::SkillLevel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobType {
    FullTime,
    PartTime,
    Contract,
    Internship,
    Temporary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Draft,
    Published,
    Paused,
    Closed,
    Expired,
}

/// Ordinal seniority ladder. Variant order is the ordinal used for mismatch penalties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceLevel {
    Entry,
    Junior,
    Mid,
    Senior,
    Lead,
    Principal,
}

impl ExperienceLevel {
    pub fn ordinal(self) -> i32 {
        self as i32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegreeLevel {
    HighSchool,
    Associate,
    Bachelor,
    Master,
    Doctorate,
}

/// Yearly salary band. `min <= max` is enforced at the store boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalaryRange {
    pub min: u32,
    pub max: u32,
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_currency() -> String {
    "USD".to_string()
}

impl SalaryRange {
    pub fn new(min: u32, max: u32) -> Self {
        Self {
            min,
            max,
            currency: default_currency(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.min <= self.max
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequiredSkill {
    pub name: String,
    /// `true` = must-have, `false` = nice-to-have.
    pub required: bool,
    pub min_level: Option<SkillLevel>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EducationRequirement {
    pub min_degree: Option<DegreeLevel>,
    #[serde(default)]
    pub fields: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyInfo {
    pub id: String,
    pub name: String,
    pub industry: Option<String>,
    pub size: Option<String>,
    #[serde(default)]
    pub culture: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobProfile {
    pub id: String,
    pub title: String,
    pub description: String,
    pub company: CompanyInfo,
    #[serde(default)]
    pub required_skills: Vec<RequiredSkill>,
    pub experience_level: Option<ExperienceLevel>,
    pub min_years_experience: Option<f64>,
    pub education: Option<EducationRequirement>,
    pub salary: Option<SalaryRange>,
    pub location: String,
    #[serde(default)]
    pub is_remote: bool,
    pub job_type: JobType,
    pub status: JobStatus,
    pub posted_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub application_count: u32,
}

impl JobProfile {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.status == JobStatus::Expired || self.expires_at.is_some_and(|e| e <= now)
    }

    /// Published and not past its expiry.
    pub fn is_open(&self, now: DateTime<Utc>) -> bool {
        self.status == JobStatus::Published && !self.is_expired(now)
    }
}
