use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::models::job::{DegreeLevel, JobType, SalaryRange};

/// Proficiency ladder shared by declared skills and job requirements.
/// Variant order is the ordering used for comparisons.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillLevel {
    Beginner,
    #[default]
    Intermediate,
    Advanced,
    Expert,
}

impl SkillLevel {
    /// 1 (beginner) ..= 4 (expert)
    pub fn rank(self) -> u8 {
        match self {
            SkillLevel::Beginner => 1,
            SkillLevel::Intermediate => 2,
            SkillLevel::Advanced => 3,
            SkillLevel::Expert => 4,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonalInfo {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub headline: Option<String>,
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Experience {
    pub title: String,
    pub company: String,
    pub location: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub is_current: bool,
    pub description: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub achievements: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Education {
    pub institution: String,
    pub degree: DegreeLevel,
    pub field_of_study: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub gpa: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    pub name: String,
    #[serde(default)]
    pub level: SkillLevel,
    #[serde(default)]
    pub endorsements: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub technologies: Vec<String>,
    pub url: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// What the candidate declared they are looking for.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobPreferences {
    #[serde(default)]
    pub job_types: Vec<JobType>,
    #[serde(default)]
    pub locations: Vec<String>,
    pub salary: Option<SalaryRange>,
    #[serde(default)]
    pub industries: Vec<String>,
    #[serde(default)]
    pub remote_only: bool,
    #[serde(default)]
    pub open_to_remote: bool,
    #[serde(default)]
    pub willing_to_relocate: bool,
    /// Work-culture values, matched against company culture tags.
    #[serde(default)]
    pub values: Vec<String>,
}

impl JobPreferences {
    pub fn accepts_remote(&self) -> bool {
        self.remote_only
            || self.open_to_remote
            || self
                .locations
                .iter()
                .any(|l| l.trim().eq_ignore_ascii_case("remote"))
    }

    pub fn is_empty(&self) -> bool {
        self.job_types.is_empty()
            && self.locations.is_empty()
            && self.salary.is_none()
            && self.industries.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub id: String,
    pub user_id: String,
    #[serde(default)]
    pub personal_info: PersonalInfo,
    #[serde(default)]
    pub experience: Vec<Experience>,
    #[serde(default)]
    pub education: Vec<Education>,
    #[serde(default)]
    pub skills: Vec<Skill>,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub job_preferences: JobPreferences,
    #[serde(default)]
    pub completeness: u8,
    pub last_updated: DateTime<Utc>,
}

impl Experience {
    /// Dates the role covers. Open-ended roles run until `today`; undated or
    /// inverted roles cover nothing.
    pub fn span(&self, today: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
        let start = self.start_date?;
        let end = match self.end_date {
            Some(end) => end,
            None if self.is_current => today,
            None => return None,
        };
        (start < end).then_some((start, end))
    }

    /// Months spent in the role.
    pub fn duration_months(&self, today: NaiveDate) -> f64 {
        self.span(today)
            .map(|(start, end)| months_between(start, end))
            .unwrap_or(0.0)
    }
}

impl CandidateProfile {
    /// Calendar years covered by experience. Concurrent roles count once.
    pub fn experience_years(&self, today: NaiveDate) -> f64 {
        let mut spans: Vec<_> = self.experience.iter().filter_map(|e| e.span(today)).collect();
        spans.sort();

        let mut months = 0.0;
        let mut current: Option<(NaiveDate, NaiveDate)> = None;
        for (start, end) in spans {
            current = match current {
                Some((s, e)) if start <= e => Some((s, e.max(end))),
                Some((s, e)) => {
                    months += months_between(s, e);
                    Some((start, end))
                }
                None => Some((start, end)),
            };
        }
        if let Some((s, e)) = current {
            months += months_between(s, e);
        }
        months / 12.0
    }

    /// An empty profile for `user_id`. Identity doubles as the profile id.
    #[cfg(test)]
    pub fn empty(user_id: &str, last_updated: DateTime<Utc>) -> Self {
        Self {
            id: user_id.to_string(),
            user_id: user_id.to_string(),
            personal_info: PersonalInfo::default(),
            experience: Vec::new(),
            education: Vec::new(),
            skills: Vec::new(),
            projects: Vec::new(),
            job_preferences: JobPreferences::default(),
            completeness: 0,
            last_updated,
        }
    }
}

fn months_between(start: NaiveDate, end: NaiveDate) -> f64 {
    let years = end.year() - start.year();
    let months = end.month() as i32 - start.month() as i32;
    let total = years * 12 + months;
    let day_frac = (end.day() as f64 - start.day() as f64) / 30.0;
    (total as f64 + day_frac).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_closed_role_duration() {
        let exp = Experience {
            start_date: Some(date(2019, 1, 1)),
            end_date: Some(date(2024, 1, 1)),
            ..Default::default()
        };
        assert_eq!(exp.duration_months(date(2030, 1, 1)), 60.0);
    }

    #[test]
    fn test_current_role_runs_until_today() {
        let exp = Experience {
            start_date: Some(date(2023, 1, 1)),
            is_current: true,
            ..Default::default()
        };
        assert_eq!(exp.duration_months(date(2024, 7, 1)), 18.0);
    }

    #[test]
    fn test_undated_role_counts_zero() {
        let exp = Experience {
            start_date: Some(date(2023, 1, 1)),
            ..Default::default()
        };
        assert_eq!(exp.duration_months(date(2024, 7, 1)), 0.0);
        assert_eq!(Experience::default().duration_months(date(2024, 7, 1)), 0.0);
    }

    #[test]
    fn test_inverted_dates_clamp_to_zero() {
        let exp = Experience {
            start_date: Some(date(2024, 1, 1)),
            end_date: Some(date(2023, 1, 1)),
            ..Default::default()
        };
        assert_eq!(exp.duration_months(date(2024, 7, 1)), 0.0);
    }

    #[test]
    fn test_overlapping_roles_count_once() {
        let role = |start, end| Experience {
            start_date: Some(start),
            end_date: Some(end),
            ..Default::default()
        };
        let mut profile = CandidateProfile::empty("u1", Utc::now());
        profile.experience = vec![
            role(date(2018, 1, 1), date(2022, 1, 1)),
            role(date(2020, 1, 1), date(2021, 1, 1)),
            role(date(2021, 6, 1), date(2023, 1, 1)),
            role(date(2024, 1, 1), date(2025, 1, 1)),
        ];
        assert_eq!(profile.experience_years(date(2030, 1, 1)), 6.0);
    }

    #[test]
    fn test_accepts_remote_via_location_keyword() {
        let prefs = JobPreferences {
            locations: vec!["Remote".into()],
            ..Default::default()
        };
        assert!(prefs.accepts_remote());
        assert!(!JobPreferences::default().accepts_remote());
    }
}
