use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// Per-dimension weights of the composite match score. Must sum to 1.0.
///
/// Defaults: skills 0.40, experience 0.25, location 0.15, salary 0.10,
/// education 0.10. Preferences and cultural fit are computed and reported
/// in the breakdown but carry no weight unless tuned in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub skills: f64,
    pub experience: f64,
    pub location: f64,
    pub salary: f64,
    pub education: f64,
    pub preferences: f64,
    pub cultural_fit: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            skills: 0.40,
            experience: 0.25,
            location: 0.15,
            salary: 0.10,
            education: 0.10,
            preferences: 0.0,
            cultural_fit: 0.0,
        }
    }
}

const SUM_TOLERANCE: f64 = 1e-6;

impl ScoringWeights {
    pub fn sum(&self) -> f64 {
        self.skills
            + self.experience
            + self.location
            + self.salary
            + self.education
            + self.preferences
            + self.cultural_fit
    }

    pub fn validate(&self) -> Result<(), AppError> {
        let all = [
            self.skills,
            self.experience,
            self.location,
            self.salary,
            self.education,
            self.preferences,
            self.cultural_fit,
        ];
        if all.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(AppError::InvalidInput(
                "scoring weights must be finite and non-negative".to_string(),
            ));
        }
        if (self.sum() - 1.0).abs() > SUM_TOLERANCE {
            return Err(AppError::InvalidInput(format!(
                "scoring weights must sum to 1.0, got {:.4}",
                self.sum()
            )));
        }
        Ok(())
    }
}
