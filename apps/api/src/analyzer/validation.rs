use serde::{Deserialize, Serialize};

use crate::models::Experience;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperienceValidation {
    pub is_valid: bool,
    pub errors: Vec<FieldError>,
}

/// Validates a single experience entry.
///
/// FAIL conditions (each reported against its field):
/// - empty `title` or `company`
/// - `end_date` before `start_date`
/// - `is_current` set together with an `end_date`
pub fn validate_experience(entry: &Experience) -> ExperienceValidation {
    let mut errors = Vec::new();

    if entry.title.trim().is_empty() {
        errors.push(field_error("title", "Job title is required"));
    }
    if entry.company.trim().is_empty() {
        errors.push(field_error("company", "Company name is required"));
    }

    if let (Some(start), Some(end)) = (entry.start_date, entry.end_date) {
        if end < start {
            errors.push(field_error(
                "end_date",
                &format!("End date {end} is before start date {start}"),
            ));
        }
    }

    if entry.is_current && entry.end_date.is_some() {
        errors.push(field_error(
            "is_current",
            "A current position cannot have an end date",
        ));
    }

    ExperienceValidation {
        is_valid: errors.is_empty(),
        errors,
    }
}

fn field_error(field: &str, message: &str) -> FieldError {
    FieldError {
        field: field.to_string(),
        message: message.to_string(),
    }
}
