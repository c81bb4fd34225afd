use serde::{Deserialize, Serialize};

use crate::models::CandidateProfile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileSection {
    PersonalInfo,
    Experience,
    Education,
    Skills,
    Projects,
}

/// Point allocation per section. Sums to 100.
pub const SECTION_POINTS: &[(ProfileSection, u8)] = &[
    (ProfileSection::PersonalInfo, 15),
    (ProfileSection::Experience, 30),
    (ProfileSection::Education, 20),
    (ProfileSection::Skills, 20),
    (ProfileSection::Projects, 15),
];

const NAME_POINTS: u8 = 5;
const EMAIL_POINTS: u8 = 5;
const HEADLINE_POINTS: u8 = 5;

const EXPERIENCE_FIRST_ENTRY: u8 = 25;
const EXPERIENCE_DEPTH_BONUS: u8 = 5;

const SKILLS_FIRST_ENTRY: u8 = 15;
const SKILLS_BREADTH_BONUS: u8 = 5;
const SKILLS_BREADTH_THRESHOLD: usize = 5;

/// Completeness in [0, 100]: the sum of each section's points.
/// Empty sections contribute nothing; no section can lower another's points.
pub fn calculate_completeness(profile: &CandidateProfile) -> u8 {
    let total: u32 = SECTION_POINTS
        .iter()
        .map(|(section, _)| section_points(profile, *section) as u32)
        .sum();
    total.min(100) as u8
}

/// Points earned by a single section, never above its allocation.
pub fn section_points(profile: &CandidateProfile, section: ProfileSection) -> u8 {
    match section {
        ProfileSection::PersonalInfo => {
            let info = &profile.personal_info;
            let mut points = 0;
            if !info.first_name.trim().is_empty() || !info.last_name.trim().is_empty() {
                points += NAME_POINTS;
            }
            if !info.email.trim().is_empty() {
                points += EMAIL_POINTS;
            }
            if has_text(&info.headline) || has_text(&info.summary) {
                points += HEADLINE_POINTS;
            }
            points
        }
        ProfileSection::Experience => match profile.experience.len() {
            0 => 0,
            1 => EXPERIENCE_FIRST_ENTRY,
            _ => EXPERIENCE_FIRST_ENTRY + EXPERIENCE_DEPTH_BONUS,
        },
        ProfileSection::Education => {
            if profile.education.is_empty() {
                0
            } else {
                allocation(ProfileSection::Education)
            }
        }
        ProfileSection::Skills => match profile.skills.len() {
            0 => 0,
            n if n >= SKILLS_BREADTH_THRESHOLD => SKILLS_FIRST_ENTRY + SKILLS_BREADTH_BONUS,
            _ => SKILLS_FIRST_ENTRY,
        },
        ProfileSection::Projects => {
            if profile.projects.is_empty() {
                0
            } else {
                allocation(ProfileSection::Projects)
            }
        }
    }
}

pub fn allocation(section: ProfileSection) -> u8 {
    SECTION_POINTS
        .iter()
        .find(|(s, _)| *s == section)
        .map(|(_, p)| *p)
        .unwrap_or(0)
}

fn has_text(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|s| !s.trim().is_empty())
}
