use serde::{Deserialize, Serialize};

use crate::analyzer::completeness::{calculate_completeness, ProfileSection};
use crate::analyzer::skills::analyze_skills;
use crate::models::CandidateProfile;

/// Completeness below which non-critical advice is `Medium` rather than `Low`.
pub const MEDIUM_PRIORITY_THRESHOLD: u8 = 70;

const SKILL_BREADTH_TARGET: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationCategory {
    Section(ProfileSection),
    Skills,
    Preferences,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub priority: Priority,
    pub category: RecommendationCategory,
    pub action: String,
    pub benefit: String,
}

/// Prioritized profile improvements, `High` first.
///
/// Every empty core section (experience, education, skills, projects) yields a
/// `High` item. Everything else is `Medium` below [`MEDIUM_PRIORITY_THRESHOLD`]
/// completeness and `Low` at or above it.
pub fn generate_recommendations(profile: &CandidateProfile) -> Vec<Recommendation> {
    let completeness = calculate_completeness(profile);
    let secondary = if completeness < MEDIUM_PRIORITY_THRESHOLD {
        Priority::Medium
    } else {
        Priority::Low
    };

    let mut recs = Vec::new();

    let core_sections = [
        (
            ProfileSection::Experience,
            profile.experience.is_empty(),
            "Add your work experience",
            "Work history is the strongest signal recruiters and matching use",
        ),
        (
            ProfileSection::Education,
            profile.education.is_empty(),
            "Add your education",
            "Many roles filter on degree and field of study",
        ),
        (
            ProfileSection::Skills,
            profile.skills.is_empty(),
            "List your skills",
            "Skills carry the largest weight in job matching",
        ),
        (
            ProfileSection::Projects,
            profile.projects.is_empty(),
            "Showcase at least one project",
            "Projects give concrete evidence of the skills you list",
        ),
    ];
    for (section, empty, action, benefit) in core_sections {
        if empty {
            recs.push(Recommendation {
                priority: Priority::High,
                category: RecommendationCategory::Section(section),
                action: action.to_string(),
                benefit: benefit.to_string(),
            });
        }
    }

    let info = &profile.personal_info;
    if info.headline.as_deref().map_or(true, |h| h.trim().is_empty()) {
        recs.push(Recommendation {
            priority: secondary,
            category: RecommendationCategory::Section(ProfileSection::PersonalInfo),
            action: "Write a professional headline".to_string(),
            benefit: "A headline is the first thing employers read".to_string(),
        });
    }
    if info.summary.as_deref().map_or(true, |s| s.trim().is_empty()) {
        recs.push(Recommendation {
            priority: secondary,
            category: RecommendationCategory::Section(ProfileSection::PersonalInfo),
            action: "Add a short professional summary".to_string(),
            benefit: "Summaries help employers understand your goals".to_string(),
        });
    }

    if profile
        .experience
        .iter()
        .any(|e| e.achievements.is_empty())
    {
        recs.push(Recommendation {
            priority: secondary,
            category: RecommendationCategory::Section(ProfileSection::Experience),
            action: "Add measurable achievements to each position".to_string(),
            benefit: "Quantified results make experience entries stand out".to_string(),
        });
    }

    let skills = analyze_skills(profile);
    if skills.total_skills > 0 && skills.total_skills < SKILL_BREADTH_TARGET {
        recs.push(Recommendation {
            priority: secondary,
            category: RecommendationCategory::Skills,
            action: format!("List at least {SKILL_BREADTH_TARGET} skills"),
            benefit: "A broader skill list matches more job requirements".to_string(),
        });
    }
    if skills.total_skills > 0 && profile.skills.iter().all(|s| s.endorsements == 0) {
        recs.push(Recommendation {
            priority: secondary,
            category: RecommendationCategory::Skills,
            action: "Ask colleagues to endorse your top skills".to_string(),
            benefit: "Endorsed skills rank higher in your skills summary".to_string(),
        });
    }
    if !skills.suggested_skills.is_empty() {
        recs.push(Recommendation {
            priority: secondary,
            category: RecommendationCategory::Skills,
            action: format!(
                "Consider learning: {}",
                skills
                    .suggested_skills
                    .iter()
                    .take(3)
                    .cloned()
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            benefit: "These skills often appear alongside the ones you have".to_string(),
        });
    }

    if profile.job_preferences.is_empty() {
        recs.push(Recommendation {
            priority: secondary,
            category: RecommendationCategory::Preferences,
            action: "Set your job preferences (locations, job types, salary)".to_string(),
            benefit: "Preferences sharpen the jobs recommended to you".to_string(),
        });
    }

    recs.sort_by_key(|r| r.priority);
    recs
}
