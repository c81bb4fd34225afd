//! Skill extraction and skill-mix analysis over a candidate profile.
//!
//! Extraction merges three sources (declared skills, experience, projects)
//! and keeps one entry per normalized name, the one with the highest confidence.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::models::{CandidateProfile, Skill, SkillLevel};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillSource {
    Declared,
    Experience,
    Projects,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedSkill {
    pub name: String,
    pub level: Option<SkillLevel>,
    pub source: SkillSource,
    /// 0.0 – 1.0
    pub confidence: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillCategory {
    Technical,
    Soft,
    Business,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillsAnalysis {
    pub total_skills: usize,
    pub categories: BTreeMap<SkillCategory, Vec<String>>,
    pub level_distribution: BTreeMap<SkillLevel, usize>,
    pub top_skills: Vec<Skill>,
    pub suggested_skills: Vec<String>,
}

const EXPERIENCE_TAG_CONFIDENCE: f64 = 0.8;
const EXPERIENCE_TEXT_CONFIDENCE: f64 = 0.6;
const PROJECT_TECH_CONFIDENCE: f64 = 0.7;
const PROJECT_TEXT_CONFIDENCE: f64 = 0.5;

const TOP_SKILLS_LIMIT: usize = 5;
const SUGGESTION_LIMIT: usize = 5;

/// Terms recognised when scanning free text (titles, descriptions, achievements).
const KNOWN_SKILLS: &[&str] = &[
    "javascript",
    "typescript",
    "react",
    "vue",
    "angular",
    "node.js",
    "python",
    "django",
    "java",
    "kotlin",
    "go",
    "rust",
    "c++",
    "c#",
    "sql",
    "postgresql",
    "mongodb",
    "redis",
    "graphql",
    "docker",
    "kubernetes",
    "aws",
    "gcp",
    "azure",
    "terraform",
    "css",
    "html",
    "machine learning",
    "data analysis",
    "leadership",
    "mentoring",
    "project management",
    "agile",
    "scrum",
];

const SOFT_KEYWORDS: &[&str] = &[
    "communication",
    "leadership",
    "teamwork",
    "collaboration",
    "mentoring",
    "problem solving",
    "time management",
    "adaptability",
    "presentation",
    "negotiation",
    "empathy",
];

const BUSINESS_KEYWORDS: &[&str] = &[
    "project management",
    "product management",
    "marketing",
    "sales",
    "finance",
    "accounting",
    "strategy",
    "business analysis",
    "budgeting",
    "stakeholder management",
    "agile",
    "scrum",
];

/// Skill → skills that commonly accompany it on job postings.
const COMPLEMENTARY_SKILLS: &[(&str, &[&str])] = &[
    ("javascript", &["typescript", "node.js"]),
    ("react", &["next.js", "redux", "testing library"]),
    ("typescript", &["graphql"]),
    ("python", &["django", "pandas"]),
    ("java", &["spring boot"]),
    ("docker", &["kubernetes"]),
    ("kubernetes", &["terraform"]),
    ("sql", &["postgresql"]),
    ("aws", &["terraform"]),
    ("machine learning", &["pytorch"]),
];

/// Trimmed, lower-cased, inner whitespace collapsed.
pub fn normalize_skill_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

pub fn extract_skills(profile: &CandidateProfile) -> Vec<ExtractedSkill> {
    let mut candidates: Vec<ExtractedSkill> = Vec::new();

    for skill in &profile.skills {
        candidates.push(ExtractedSkill {
            name: skill.name.trim().to_string(),
            level: Some(skill.level),
            source: SkillSource::Declared,
            confidence: declared_confidence(skill.level),
        });
    }

    for exp in &profile.experience {
        for tag in &exp.skills {
            candidates.push(inferred(tag, SkillSource::Experience, EXPERIENCE_TAG_CONFIDENCE));
        }
        let mut text = exp.title.clone();
        if let Some(desc) = &exp.description {
            text.push(' ');
            text.push_str(desc);
        }
        for achievement in &exp.achievements {
            text.push(' ');
            text.push_str(achievement);
        }
        for term in scan_known_skills(&text) {
            candidates.push(inferred(term, SkillSource::Experience, EXPERIENCE_TEXT_CONFIDENCE));
        }
    }

    for project in &profile.projects {
        for tech in &project.technologies {
            candidates.push(inferred(tech, SkillSource::Projects, PROJECT_TECH_CONFIDENCE));
        }
        for term in scan_known_skills(&project.description) {
            candidates.push(inferred(term, SkillSource::Projects, PROJECT_TEXT_CONFIDENCE));
        }
    }

    dedupe_skills(candidates)
}

/// One entry per normalized name, highest confidence wins (first seen on ties).
/// Sorted by confidence descending, then name.
pub fn dedupe_skills(skills: Vec<ExtractedSkill>) -> Vec<ExtractedSkill> {
    let mut best: BTreeMap<String, ExtractedSkill> = BTreeMap::new();
    for skill in skills {
        let key = normalize_skill_name(&skill.name);
        if key.is_empty() {
            continue;
        }
        match best.get(&key) {
            Some(existing) if existing.confidence >= skill.confidence => {}
            _ => {
                best.insert(key, skill);
            }
        }
    }

    let mut out: Vec<(String, ExtractedSkill)> = best.into_iter().collect();
    out.sort_by(|(ka, a), (kb, b)| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| ka.cmp(kb))
    });
    out.into_iter().map(|(_, s)| s).collect()
}

pub fn categorize_skill(name: &str) -> SkillCategory {
    let normalized = normalize_skill_name(name);
    if SOFT_KEYWORDS.iter().any(|k| normalized.contains(k)) {
        SkillCategory::Soft
    } else if BUSINESS_KEYWORDS.iter().any(|k| normalized.contains(k)) {
        SkillCategory::Business
    } else {
        SkillCategory::Technical
    }
}

pub fn analyze_skills(profile: &CandidateProfile) -> SkillsAnalysis {
    let mut seen = BTreeSet::new();
    let declared: Vec<&Skill> = profile
        .skills
        .iter()
        .filter(|s| {
            let key = normalize_skill_name(&s.name);
            !key.is_empty() && seen.insert(key)
        })
        .collect();

    let mut categories: BTreeMap<SkillCategory, Vec<String>> = BTreeMap::new();
    let mut level_distribution: BTreeMap<SkillLevel, usize> = BTreeMap::new();
    for skill in &declared {
        categories
            .entry(categorize_skill(&skill.name))
            .or_default()
            .push(skill.name.trim().to_string());
        *level_distribution.entry(skill.level).or_insert(0) += 1;
    }

    let mut top: Vec<&Skill> = declared.clone();
    top.sort_by(|a, b| {
        b.endorsements
            .cmp(&a.endorsements)
            .then_with(|| b.level.cmp(&a.level))
            .then_with(|| normalize_skill_name(&a.name).cmp(&normalize_skill_name(&b.name)))
    });
    let top_skills = top.into_iter().take(TOP_SKILLS_LIMIT).cloned().collect();

    SkillsAnalysis {
        total_skills: declared.len(),
        suggested_skills: suggest_skills(profile, &categories),
        categories,
        level_distribution,
        top_skills,
    }
}

fn suggest_skills(
    profile: &CandidateProfile,
    categories: &BTreeMap<SkillCategory, Vec<String>>,
) -> Vec<String> {
    let known: BTreeSet<String> = extract_skills(profile)
        .iter()
        .map(|s| normalize_skill_name(&s.name))
        .collect();

    let mut suggestions: Vec<String> = Vec::new();
    for (skill, complements) in COMPLEMENTARY_SKILLS {
        if !known.contains(*skill) {
            continue;
        }
        for complement in *complements {
            let c = complement.to_string();
            if !known.contains(&c) && !suggestions.contains(&c) {
                suggestions.push(c);
            }
        }
    }

    if !known.is_empty() && !categories.contains_key(&SkillCategory::Soft) {
        suggestions.insert(0, "communication".to_string());
    }

    suggestions.truncate(SUGGESTION_LIMIT);
    suggestions
}

fn declared_confidence(level: SkillLevel) -> f64 {
    match level {
        SkillLevel::Expert => 1.0,
        SkillLevel::Advanced => 0.9,
        SkillLevel::Intermediate => 0.75,
        SkillLevel::Beginner => 0.6,
    }
}

fn inferred(name: &str, source: SkillSource, confidence: f64) -> ExtractedSkill {
    ExtractedSkill {
        name: name.trim().to_string(),
        level: None,
        source,
        confidence,
    }
}

/// Known skill terms appearing as whole words in `text`.
fn scan_known_skills(text: &str) -> Vec<&'static str> {
    let tokens: Vec<String> = text
        .split_whitespace()
        .map(|t| {
            t.trim_matches(|c: char| matches!(c, ',' | ';' | ':' | '(' | ')' | '!' | '?' | '"'))
                .trim_end_matches('.')
                .to_lowercase()
        })
        .filter(|t| !t.is_empty())
        .collect();
    let padded = format!(" {} ", tokens.join(" "));
    KNOWN_SKILLS
        .iter()
        .copied()
        .filter(|term| padded.contains(&format!(" {term} ")))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::candidate::Project;
    use crate::models::Experience;
    use crate::test_support::{empty_profile, frontend_candidate, skill};

    #[test]
    fn test_normalize_trims_and_lowercases() {
        assert_eq!(normalize_skill_name("  Node.JS  "), "node.js");
        assert_eq!(normalize_skill_name("Machine   Learning"), "machine learning");
    }

    #[test]
    fn test_extract_dedupes_case_insensitively() {
        let mut profile = empty_profile("u1");
        profile.skills = vec![skill("React", SkillLevel::Intermediate, 0)];
        profile.experience = vec![Experience {
            title: "Developer".into(),
            company: "Acme".into(),
            skills: vec!["react ".into(), "REACT".into()],
            ..Default::default()
        }];

        let skills = extract_skills(&profile);
        let reacts: Vec<_> = skills
            .iter()
            .filter(|s| normalize_skill_name(&s.name) == "react")
            .collect();
        assert_eq!(reacts.len(), 1);
        // experience tag (0.8) beats declared intermediate (0.75)
        assert_eq!(reacts[0].source, SkillSource::Experience);
        assert!((reacts[0].confidence - 0.8).abs() < f64::EPSILON);
    }

    #[test]
    fn test_declared_expert_keeps_highest_confidence() {
        let mut profile = empty_profile("u1");
        profile.skills = vec![skill("Rust", SkillLevel::Expert, 3)];
        profile.projects = vec![Project {
            name: "cli".into(),
            description: "A tool written in Rust".into(),
            technologies: vec!["rust".into()],
            ..Default::default()
        }];
        let skills = extract_skills(&profile);
        assert_eq!(skills.len(), 1);
        assert_eq!(skills[0].source, SkillSource::Declared);
        assert_eq!(skills[0].confidence, 1.0);
    }

    #[test]
    fn test_extraction_is_idempotent_and_unique() {
        let profile = frontend_candidate();
        let first = extract_skills(&profile);
        let second = extract_skills(&profile);
        assert_eq!(first, second);

        let names: BTreeSet<String> = first.iter().map(|s| normalize_skill_name(&s.name)).collect();
        assert_eq!(names.len(), first.len());

        let again = dedupe_skills(first.clone());
        assert_eq!(again, first);
    }

    #[test]
    fn test_text_scan_finds_whole_words_only() {
        let found = scan_known_skills("Built dashboards in React, shipped Go services.");
        assert!(found.contains(&"react"));
        assert!(found.contains(&"go"));
        assert!(!scan_known_skills("Good at algorithms").contains(&"go"));
    }

    #[test]
    fn test_confidence_within_bounds() {
        for s in extract_skills(&frontend_candidate()) {
            assert!((0.0..=1.0).contains(&s.confidence));
        }
    }

    #[test]
    fn test_categorize_skills() {
        assert_eq!(categorize_skill("Communication"), SkillCategory::Soft);
        assert_eq!(categorize_skill("Project Management"), SkillCategory::Business);
        assert_eq!(categorize_skill("TypeScript"), SkillCategory::Technical);
    }

    #[test]
    fn test_top_skills_ordered_by_endorsements_then_level() {
        let mut profile = empty_profile("u1");
        profile.skills = vec![
            skill("CSS", SkillLevel::Intermediate, 10),
            skill("React", SkillLevel::Expert, 10),
            skill("SQL", SkillLevel::Expert, 2),
            skill("Vue", SkillLevel::Beginner, 25),
        ];
        let analysis = analyze_skills(&profile);
        let names: Vec<_> = analysis.top_skills.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Vue", "React", "CSS", "SQL"]);
    }

    #[test]
    fn test_analyze_skills_distribution_and_suggestions() {
        let mut profile = empty_profile("u1");
        profile.skills = vec![
            skill("JavaScript", SkillLevel::Expert, 0),
            skill("React", SkillLevel::Expert, 0),
            skill("javascript", SkillLevel::Beginner, 0),
        ];
        let analysis = analyze_skills(&profile);
        assert_eq!(analysis.total_skills, 2);
        assert_eq!(analysis.level_distribution.get(&SkillLevel::Expert), Some(&2));
        assert!(analysis.suggested_skills.contains(&"typescript".to_string()));
        assert!(analysis.suggested_skills.contains(&"communication".to_string()));
        assert!(analysis.suggested_skills.len() <= SUGGESTION_LIMIT);
    }

    #[test]
    fn test_analyze_skills_empty_profile() {
        let analysis = analyze_skills(&empty_profile("u1"));
        assert_eq!(analysis.total_skills, 0);
        assert!(analysis.top_skills.is_empty());
        assert!(analysis.suggested_skills.is_empty());
    }
}
