//! Per-dimension sub-scores. Every function returns a value in [0, 1].
//!
//! Degraded input (no skills, no experience, no education, no declared
//! preference) scores zero or neutral; nothing here fails.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::analyzer::skills::normalize_skill_name;
use crate::models::{
    CandidateProfile, CompanyInfo, ExperienceLevel, JobPreferences, JobProfile, SalaryRange,
    SkillLevel,
};
use crate::scoring::text::tokenize;

pub const NEUTRAL: f64 = 0.5;

const REQUIRED_SKILL_WEIGHT: f64 = 2.0;
const PREFERRED_SKILL_WEIGHT: f64 = 1.0;

/// Penalty per ordinal step the candidate sits below the job's level.
const UNDER_LEVEL_PENALTY: f64 = 0.25;
/// Penalty per ordinal step above (overqualification).
const OVER_LEVEL_PENALTY: f64 = 0.10;

const EDUCATION_PRESENCE: f64 = 0.6;
const EDUCATION_RELEVANCE: f64 = 0.4;
const DEGREE_SHORTFALL_FACTOR: f64 = 0.5;

const RELOCATION_SCORE: f64 = 0.4;
pub const SALARY_FLOOR: f64 = 0.1;

#[derive(Debug, Clone, PartialEq)]
pub struct SkillsOutcome {
    pub score: f64,
    pub matched: Vec<String>,
    /// Required skills the candidate lacks, in job order.
    pub missing_required: Vec<String>,
}

/// Candidate skill inventory: normalized name → best known level.
/// Skills only seen in experience/projects have no level.
fn candidate_skill_levels(candidate: &CandidateProfile) -> HashMap<String, Option<SkillLevel>> {
    let mut levels: HashMap<String, Option<SkillLevel>> = HashMap::new();
    for skill in &candidate.skills {
        let entry = levels.entry(normalize_skill_name(&skill.name)).or_insert(None);
        *entry = Some(entry.map_or(skill.level, |l| l.max(skill.level)));
    }
    let inferred = candidate
        .experience
        .iter()
        .flat_map(|e| e.skills.iter())
        .chain(candidate.projects.iter().flat_map(|p| p.technologies.iter()));
    for name in inferred {
        levels.entry(normalize_skill_name(name)).or_insert(None);
    }
    levels
}

/// Weighted share of the job's skills the candidate covers. Required skills
/// weigh double; a level below the job's minimum earns `have / need` credit.
/// A job with no declared skills scores 0.
pub fn skills_match(candidate: &CandidateProfile, job: &JobProfile) -> SkillsOutcome {
    if job.required_skills.is_empty() {
        return SkillsOutcome {
            score: 0.0,
            matched: vec![],
            missing_required: vec![],
        };
    }

    let levels = candidate_skill_levels(candidate);
    let mut total = 0.0;
    let mut earned = 0.0;
    let mut matched = Vec::new();
    let mut missing_required = Vec::new();

    for req in &job.required_skills {
        let weight = if req.required {
            REQUIRED_SKILL_WEIGHT
        } else {
            PREFERRED_SKILL_WEIGHT
        };
        total += weight;

        match levels.get(&normalize_skill_name(&req.name)) {
            Some(have) => {
                let have = have.unwrap_or_default();
                let credit = match req.min_level {
                    Some(need) if have < need => have.rank() as f64 / need.rank() as f64,
                    _ => 1.0,
                };
                earned += weight * credit;
                matched.push(req.name.clone());
            }
            None => {
                if req.required {
                    missing_required.push(req.name.clone());
                }
            }
        }
    }

    SkillsOutcome {
        score: (earned / total).clamp(0.0, 1.0),
        matched,
        missing_required,
    }
}

/// Ordinal level for a number of years in the workforce.
pub fn level_for_years(years: f64) -> ExperienceLevel {
    match years {
        y if y < 1.0 => ExperienceLevel::Entry,
        y if y < 3.0 => ExperienceLevel::Junior,
        y if y < 5.0 => ExperienceLevel::Mid,
        y if y < 8.0 => ExperienceLevel::Senior,
        y if y < 12.0 => ExperienceLevel::Lead,
        _ => ExperienceLevel::Principal,
    }
}

pub fn experience_match(candidate: &CandidateProfile, job: &JobProfile, today: NaiveDate) -> f64 {
    if candidate.experience.is_empty() {
        return 0.0;
    }
    let years = candidate.experience_years(today);

    if let Some(required) = job.experience_level {
        let diff = level_for_years(years).ordinal() - required.ordinal();
        let penalty = if diff < 0 {
            UNDER_LEVEL_PENALTY * (-diff) as f64
        } else {
            OVER_LEVEL_PENALTY * diff as f64
        };
        return (1.0 - penalty).clamp(0.0, 1.0);
    }

    match job.min_years_experience {
        Some(min) if min > 0.0 => (years / min).clamp(0.0, 1.0),
        _ => 1.0,
    }
}

/// Best-scoring education entry: presence, field relevance, degree level.
pub fn education_match(candidate: &CandidateProfile, job: &JobProfile) -> f64 {
    let requirement = job.education.as_ref();
    let job_terms = match requirement.filter(|r| !r.fields.is_empty()) {
        Some(r) => tokenize(&r.fields.join(" ")),
        None => tokenize(&format!("{} {}", job.title, job.description)),
    };

    candidate
        .education
        .iter()
        .map(|edu| {
            let field_terms = tokenize(&edu.field_of_study);
            let relevant = field_terms.intersection(&job_terms).next().is_some();
            let mut score = EDUCATION_PRESENCE + if relevant { EDUCATION_RELEVANCE } else { 0.0 };
            if let Some(min) = requirement.and_then(|r| r.min_degree) {
                if edu.degree < min {
                    score *= DEGREE_SHORTFALL_FACTOR;
                }
            }
            score
        })
        .fold(0.0, f64::max)
}

pub fn location_match(prefs: &JobPreferences, job: &JobProfile) -> f64 {
    if job.is_remote && prefs.accepts_remote() {
        return 1.0;
    }
    if prefs.remote_only && !job.is_remote {
        return 0.0;
    }

    let places: Vec<String> = prefs
        .locations
        .iter()
        .map(|l| l.trim().to_lowercase())
        .filter(|l| !l.is_empty() && l != "remote")
        .collect();
    if places.is_empty() {
        return NEUTRAL;
    }

    let job_location = job.location.trim().to_lowercase();
    let hit = places
        .iter()
        .any(|p| job_location.contains(p.as_str()) || (!job_location.is_empty() && p.contains(&job_location)));
    if hit {
        1.0
    } else if prefs.willing_to_relocate {
        RELOCATION_SCORE
    } else {
        0.0
    }
}

/// Overlap of the two ranges relative to the narrower one, floored at
/// [`SALARY_FLOOR`]. Neutral when either side is undeclared.
pub fn salary_match(desired: Option<&SalaryRange>, offered: Option<&SalaryRange>) -> f64 {
    let (Some(desired), Some(offered)) = (desired, offered) else {
        return NEUTRAL;
    };
    if !desired.is_valid() || !offered.is_valid() {
        return NEUTRAL;
    }

    let overlap = desired.max.min(offered.max) as i64 - desired.min.max(offered.min) as i64;
    if overlap < 0 {
        return SALARY_FLOOR;
    }
    let narrower = (desired.max - desired.min).min(offered.max - offered.min);
    if narrower == 0 {
        return 1.0;
    }
    (overlap as f64 / narrower as f64).clamp(SALARY_FLOOR, 1.0)
}

/// Job type and industry alignment, averaged over what the candidate declared.
pub fn preferences_match(prefs: &JobPreferences, job: &JobProfile) -> f64 {
    let mut parts = Vec::new();
    if !prefs.job_types.is_empty() {
        parts.push(if prefs.job_types.contains(&job.job_type) { 1.0 } else { 0.0 });
    }
    if !prefs.industries.is_empty() {
        let hit = job.company.industry.as_deref().is_some_and(|industry| {
            let industry = industry.to_lowercase();
            prefs
                .industries
                .iter()
                .any(|i| industry.contains(&i.trim().to_lowercase()))
        });
        parts.push(if hit { 1.0 } else { 0.0 });
    }
    if parts.is_empty() {
        return NEUTRAL;
    }
    parts.iter().sum::<f64>() / parts.len() as f64
}

/// Share of the candidate's values present in the company's culture tags.
pub fn cultural_fit_match(values: &[String], company: &CompanyInfo) -> f64 {
    if values.is_empty() || company.culture.is_empty() {
        return NEUTRAL;
    }
    let culture: Vec<String> = company.culture.iter().map(|c| normalize_skill_name(c)).collect();
    let hits = values
        .iter()
        .filter(|v| culture.contains(&normalize_skill_name(v)))
        .count();
    hits as f64 / values.len() as f64
}
