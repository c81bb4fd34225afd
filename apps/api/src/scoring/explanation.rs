use serde::{Deserialize, Serialize};

use crate::scoring::dimensions::SkillsOutcome;
use crate::scoring::weights::ScoringWeights;
use crate::scoring::Dimension;

/// Sub-score (0–1) above which a dimension is reported as a strength.
pub const STRENGTH_THRESHOLD: f64 = 0.8;
/// Sub-score (0–1) below which a dimension is reported as a weakness.
pub const WEAKNESS_THRESHOLD: f64 = 0.3;
const MAX_SKILL_GAPS: usize = 3;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchExplanation {
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub skill_gaps: Vec<String>,
    pub suggestions: Vec<String>,
}

/// Builds the explanation from normalized sub-scores, in a fixed dimension order.
/// Dimensions with zero weight are not mentioned.
pub fn build_explanation(
    subscores: &[(Dimension, f64)],
    weights: &ScoringWeights,
    skills: &SkillsOutcome,
) -> MatchExplanation {
    let mut explanation = MatchExplanation::default();

    for &(dimension, score) in subscores {
        if dimension.weight(weights) <= 0.0 {
            continue;
        }
        if score > STRENGTH_THRESHOLD {
            explanation.strengths.push(strength_text(dimension, score));
        } else if score < WEAKNESS_THRESHOLD {
            explanation.weaknesses.push(weakness_text(dimension).to_string());
            if let Some(s) = suggestion_text(dimension) {
                explanation.suggestions.push(s.to_string());
            }
        }
    }

    let skills_score = subscores
        .iter()
        .find(|(d, _)| *d == Dimension::Skills)
        .map(|(_, s)| *s)
        .unwrap_or(0.0);
    if skills_score <= STRENGTH_THRESHOLD {
        explanation.skill_gaps = skills
            .missing_required
            .iter()
            .take(MAX_SKILL_GAPS)
            .cloned()
            .collect();
        for gap in &explanation.skill_gaps {
            explanation
                .suggestions
                .push(format!("Build and showcase experience with {gap}"));
        }
    }

    explanation
}

fn strength_text(dimension: Dimension, score: f64) -> String {
    match dimension {
        Dimension::Skills => format!("Strong skills match ({:.0}%)", score * 100.0),
        Dimension::Experience => "Experience level fits the role".to_string(),
        Dimension::Education => "Relevant educational background".to_string(),
        Dimension::Location => "Location or remote setup works for you".to_string(),
        Dimension::Salary => "Salary range fits your expectations".to_string(),
        Dimension::Preferences => "Matches your job type and industry preferences".to_string(),
        Dimension::CulturalFit => "Company culture aligns with your values".to_string(),
    }
}

fn weakness_text(dimension: Dimension) -> &'static str {
    match dimension {
        Dimension::Skills => "Limited overlap with the required skills",
        Dimension::Experience => "Experience level differs from what the role expects",
        Dimension::Education => "Education does not match the role's requirements",
        Dimension::Location => "Location does not match your preferences",
        Dimension::Salary => "Salary range is outside your expectations",
        Dimension::Preferences => "Job type or industry is outside your preferences",
        Dimension::CulturalFit => "Company culture differs from your stated values",
    }
}

fn suggestion_text(dimension: Dimension) -> Option<&'static str> {
    match dimension {
        // skill gaps carry their own suggestions
        Dimension::Skills => None,
        Dimension::Experience => {
            Some("Highlight projects and responsibilities that match the role's seniority")
        }
        Dimension::Education => Some("Add education or certifications relevant to the role"),
        Dimension::Location => Some("Consider remote-friendly roles or widen your locations"),
        Dimension::Salary => Some("Review your salary expectations for roles like this"),
        Dimension::Preferences => Some("Update your preferences if you are open to this kind of role"),
        Dimension::CulturalFit => None,
    }
}
