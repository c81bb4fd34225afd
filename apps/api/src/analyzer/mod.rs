//! Profile analyzer: completeness, skill extraction, experience validation and
//! improvement advice for a candidate profile.
//!
//! Pure functions over `CandidateProfile`; the only ambient input is the clock
//! used to stamp `analyzed_at` and to date open-ended roles.

pub mod completeness;
pub mod recommendations;
pub mod skills;
pub mod validation;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::clock::Clock;
use crate::errors::AppError;
use crate::models::CandidateProfile;

pub use completeness::calculate_completeness;
pub use recommendations::{generate_recommendations, Priority, Recommendation};
pub use validation::validate_experience;

const BROAD_SKILL_SET: usize = 5;
const WELL_ENDORSED: u32 = 10;
const SEASONED_YEARS: f64 = 5.0;
const COMPLETE_PROFILE: u8 = 80;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub completeness: u8,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub recommendations: Vec<Recommendation>,
    pub analyzed_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct ProfileAnalyzer {
    clock: Arc<dyn Clock>,
}

impl ProfileAnalyzer {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Full analysis of a profile.
    ///
    /// Fails only when `profile` is absent. A profile without identity is
    /// treated as malformed and analyzed as `completeness = 0`.
    pub fn analyze_profile(
        &self,
        profile: Option<&CandidateProfile>,
    ) -> Result<AnalysisResult, AppError> {
        let profile =
            profile.ok_or_else(|| AppError::InvalidInput("profile is required".to_string()))?;

        if profile.id.trim().is_empty() {
            return Ok(self.malformed("profile has no identifier"));
        }

        let completeness = calculate_completeness(profile);
        Ok(AnalysisResult {
            completeness,
            strengths: self.strengths(profile, completeness),
            weaknesses: weaknesses(profile),
            recommendations: generate_recommendations(profile),
            analyzed_at: self.clock.now(),
        })
    }

    /// Analyzes a raw profile record as delivered by a store or a client.
    /// `null` is absent; anything that does not decode is malformed.
    pub fn analyze_profile_value(
        &self,
        raw: &serde_json::Value,
    ) -> Result<AnalysisResult, AppError> {
        if raw.is_null() {
            return Err(AppError::InvalidInput("profile is required".to_string()));
        }
        match serde_json::from_value::<CandidateProfile>(raw.clone()) {
            Ok(profile) => self.analyze_profile(Some(&profile)),
            Err(e) => {
                warn!("Analyzing undecodable profile record: {e}");
                Ok(self.malformed(&e.to_string()))
            }
        }
    }

    fn malformed(&self, reason: &str) -> AnalysisResult {
        AnalysisResult {
            completeness: 0,
            strengths: Vec::new(),
            weaknesses: vec![
                format!("Profile data could not be read: {reason}"),
                "Experience could not be evaluated".to_string(),
                "Education could not be evaluated".to_string(),
                "Skills could not be evaluated".to_string(),
                "Projects could not be evaluated".to_string(),
            ],
            recommendations: vec![Recommendation {
                priority: Priority::High,
                category: recommendations::RecommendationCategory::Section(
                    completeness::ProfileSection::PersonalInfo,
                ),
                action: "Re-save your profile to repair missing or invalid fields".to_string(),
                benefit: "A readable profile is required for any job matching".to_string(),
            }],
            analyzed_at: self.clock.now(),
        }
    }

    fn strengths(&self, profile: &CandidateProfile, completeness: u8) -> Vec<String> {
        let mut strengths = Vec::new();
        let today = self.clock.now().date_naive();

        match profile.experience.len() {
            0 => {}
            1 => strengths.push("Work experience listed".to_string()),
            n => strengths.push(format!("Solid work history ({n} positions)")),
        }
        let years = profile.experience_years(today);
        if years >= SEASONED_YEARS {
            strengths.push(format!("{years:.0} years of professional experience"));
        }
        if let Some(edu) = profile.education.first() {
            strengths.push(format!(
                "Education in {} from {}",
                edu.field_of_study, edu.institution
            ));
        }
        if profile.skills.len() >= BROAD_SKILL_SET {
            strengths.push(format!("Broad skill set ({} skills)", profile.skills.len()));
        }
        let endorsements: u32 = profile.skills.iter().map(|s| s.endorsements).sum();
        if endorsements >= WELL_ENDORSED {
            strengths.push(format!("Skills endorsed {endorsements} times"));
        }
        if !profile.projects.is_empty() {
            strengths.push(format!(
                "Portfolio of {} project(s)",
                profile.projects.len()
            ));
        }
        if completeness >= COMPLETE_PROFILE {
            strengths.push("Profile is nearly complete".to_string());
        }
        strengths
    }
}

fn weaknesses(profile: &CandidateProfile) -> Vec<String> {
    let mut weaknesses = Vec::new();
    let info = &profile.personal_info;

    if info.first_name.trim().is_empty() && info.last_name.trim().is_empty() {
        weaknesses.push("Name is missing".to_string());
    }
    if info.email.trim().is_empty() {
        weaknesses.push("Contact email is missing".to_string());
    }
    if info.headline.as_deref().map_or(true, |h| h.trim().is_empty()) {
        weaknesses.push("No professional headline".to_string());
    }
    if info.summary.as_deref().map_or(true, |s| s.trim().is_empty()) {
        weaknesses.push("No professional summary".to_string());
    }
    if profile.experience.is_empty() {
        weaknesses.push("No work experience listed".to_string());
    }
    if profile.education.is_empty() {
        weaknesses.push("No education listed".to_string());
    }
    if profile.skills.is_empty() {
        weaknesses.push("No skills listed".to_string());
    } else if profile.skills.len() < BROAD_SKILL_SET {
        weaknesses.push(format!(
            "Only {} skill(s) listed",
            profile.skills.len()
        ));
    }
    if profile.projects.is_empty() {
        weaknesses.push("No projects listed".to_string());
    }
    if profile.job_preferences.is_empty() {
        weaknesses.push("No job preferences set".to_string());
    }

    for exp in &profile.experience {
        let validation = validate_experience(exp);
        for error in validation.errors {
            let label = if exp.company.trim().is_empty() {
                "an experience entry".to_string()
            } else {
                exp.company.clone()
            };
            weaknesses.push(format!("Experience at {label}: {}", error.message));
        }
    }

    weaknesses
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::test_support::{empty_profile, fixed_now, frontend_candidate};
    use chrono::NaiveDate;
    use serde_json::json;

    fn analyzer() -> ProfileAnalyzer {
        ProfileAnalyzer::new(Arc::new(ManualClock::new(fixed_now())))
    }

    #[test]
    fn test_absent_profile_is_invalid_input() {
        let err = analyzer().analyze_profile(None).unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[test]
    fn test_null_value_is_invalid_input() {
        let err = analyzer().analyze_profile_value(&json!(null)).unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[test]
    fn test_malformed_value_returns_zero_completeness() {
        let result = analyzer()
            .analyze_profile_value(&json!({"id": 42, "experience": "lots"}))
            .unwrap();
        assert_eq!(result.completeness, 0);
        assert!(!result.weaknesses.is_empty());
    }

    #[test]
    fn test_profile_without_id_is_malformed() {
        let mut profile = frontend_candidate();
        profile.id = String::new();
        let result = analyzer().analyze_profile(Some(&profile)).unwrap();
        assert_eq!(result.completeness, 0);
    }

    #[test]
    fn test_empty_profile_is_weak() {
        let result = analyzer()
            .analyze_profile(Some(&empty_profile("u1")))
            .unwrap();
        assert!(result.completeness < 20, "got {}", result.completeness);
        assert!(result.weaknesses.len() > 5, "got {:?}", result.weaknesses);
        assert_eq!(result.analyzed_at, fixed_now());
    }

    #[test]
    fn test_full_profile_has_strengths() {
        let result = analyzer()
            .analyze_profile(Some(&frontend_candidate()))
            .unwrap();
        assert_eq!(result.completeness, 100);
        assert!(result.strengths.iter().any(|s| s.contains("work history")));
        assert!(result.strengths.iter().any(|s| s.contains("Broad skill set")));
    }

    #[test]
    fn test_invalid_experience_surfaces_as_weakness() {
        let mut profile = frontend_candidate();
        profile.experience[0].end_date = NaiveDate::from_ymd_opt(2000, 1, 1);
        let result = analyzer().analyze_profile(Some(&profile)).unwrap();
        assert!(result
            .weaknesses
            .iter()
            .any(|w| w.contains("before start date")));
    }

    #[test]
    fn test_analysis_is_deterministic() {
        let a = analyzer();
        let profile = frontend_candidate();
        assert_eq!(
            a.analyze_profile(Some(&profile)).unwrap(),
            a.analyze_profile(Some(&profile)).unwrap()
        );
    }
}
