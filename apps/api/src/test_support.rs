//! Shared fixtures for unit tests.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};

use crate::models::candidate::{Education, PersonalInfo, Project};
use crate::models::job::DegreeLevel;
use crate::models::{
    CandidateProfile, CompanyInfo, Experience, ExperienceLevel, JobPreferences, JobProfile,
    JobStatus, JobType, RequiredSkill, SalaryRange, Skill, SkillLevel,
};

pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(y, m, d)
}

pub fn skill(name: &str, level: SkillLevel, endorsements: u32) -> Skill {
    Skill {
        name: name.to_string(),
        level,
        endorsements,
    }
}

pub fn required(name: &str, min_level: Option<SkillLevel>) -> RequiredSkill {
    RequiredSkill {
        name: name.to_string(),
        required: true,
        min_level,
    }
}

pub fn preferred(name: &str) -> RequiredSkill {
    RequiredSkill {
        name: name.to_string(),
        required: false,
        min_level: None,
    }
}

/// Name and email only.
pub fn empty_profile(user_id: &str) -> CandidateProfile {
    let mut profile = CandidateProfile::empty(user_id, fixed_now());
    profile.personal_info.first_name = "Sam".to_string();
    profile.personal_info.email = "sam@example.com".to_string();
    profile
}

/// Every section filled; completeness 100.
pub fn frontend_candidate() -> CandidateProfile {
    CandidateProfile {
        id: "cand-1".to_string(),
        user_id: "user-1".to_string(),
        personal_info: PersonalInfo {
            first_name: "Robin".to_string(),
            last_name: "Park".to_string(),
            email: "robin@example.com".to_string(),
            phone: None,
            location: Some("Berlin".to_string()),
            headline: Some("Senior Frontend Developer".to_string()),
            summary: Some("Building fast web apps with React and TypeScript.".to_string()),
        },
        experience: vec![
            Experience {
                title: "Senior Frontend Developer".to_string(),
                company: "Acme".to_string(),
                location: Some("Berlin".to_string()),
                start_date: date(2019, 1, 1),
                end_date: date(2024, 1, 1),
                is_current: false,
                description: Some("Led the React migration of the storefront.".to_string()),
                skills: vec!["JavaScript".to_string(), "React".to_string()],
                achievements: vec!["Cut bundle size by 40%".to_string()],
            },
            Experience {
                title: "Frontend Developer".to_string(),
                company: "Beta".to_string(),
                location: None,
                start_date: date(2016, 6, 1),
                end_date: date(2018, 12, 1),
                is_current: false,
                description: None,
                skills: vec!["CSS".to_string()],
                achievements: vec!["Shipped 12 marketing sites".to_string()],
            },
        ],
        education: vec![Education {
            institution: "TU Berlin".to_string(),
            degree: DegreeLevel::Bachelor,
            field_of_study: "Computer Science".to_string(),
            start_date: date(2012, 10, 1),
            end_date: date(2016, 3, 1),
            gpa: None,
        }],
        skills: vec![
            skill("JavaScript", SkillLevel::Expert, 12),
            skill("React", SkillLevel::Expert, 8),
            skill("TypeScript", SkillLevel::Advanced, 5),
            skill("CSS", SkillLevel::Advanced, 2),
            skill("Communication", SkillLevel::Intermediate, 1),
        ],
        projects: vec![Project {
            name: "design-system".to_string(),
            description: "Component library in TypeScript used by 4 teams".to_string(),
            technologies: vec!["TypeScript".to_string(), "Storybook".to_string()],
            url: None,
            start_date: date(2021, 1, 1),
            end_date: None,
        }],
        job_preferences: JobPreferences {
            job_types: vec![JobType::FullTime],
            locations: vec!["Berlin".to_string()],
            salary: Some(SalaryRange::new(120_000, 180_000)),
            industries: vec!["Software".to_string()],
            remote_only: false,
            open_to_remote: true,
            willing_to_relocate: false,
            values: vec!["ownership".to_string()],
        },
        completeness: 100,
        last_updated: fixed_now(),
    }
}

/// JavaScript/React/TypeScript, five years as a senior frontend developer,
/// 120–180k, open to remote. No education.
pub fn scenario_candidate() -> CandidateProfile {
    let mut profile = CandidateProfile::empty("user-scenario", fixed_now());
    profile.id = "cand-scenario".to_string();
    profile.skills = vec![
        skill("JavaScript", SkillLevel::Expert, 0),
        skill("React", SkillLevel::Expert, 0),
        skill("TypeScript", SkillLevel::Advanced, 0),
    ];
    profile.experience = vec![Experience {
        title: "Senior Frontend Developer".to_string(),
        company: "Acme".to_string(),
        start_date: date(2019, 1, 1),
        end_date: date(2024, 1, 1),
        ..Default::default()
    }];
    profile.job_preferences = JobPreferences {
        salary: Some(SalaryRange::new(120_000, 180_000)),
        open_to_remote: true,
        ..Default::default()
    };
    profile
}

pub fn job(id: &str, title: &str, posted_days_ago: i64) -> JobProfile {
    JobProfile {
        id: id.to_string(),
        title: title.to_string(),
        description: format!("{title} role"),
        company: CompanyInfo {
            id: "co-1".to_string(),
            name: "Globex".to_string(),
            industry: Some("Software".to_string()),
            size: None,
            culture: vec![],
        },
        required_skills: vec![],
        experience_level: None,
        min_years_experience: None,
        education: None,
        salary: None,
        location: "Berlin".to_string(),
        is_remote: false,
        job_type: JobType::FullTime,
        status: JobStatus::Published,
        posted_at: fixed_now() - Duration::days(posted_days_ago),
        expires_at: Some(fixed_now() + Duration::days(30)),
        application_count: 0,
    }
}

/// Remote senior frontend role paying 130–170k requiring the scenario skills at advanced.
pub fn scenario_job() -> JobProfile {
    let mut j = job("job-scenario", "Senior Frontend Engineer", 2);
    j.description =
        "Build our React and TypeScript web platform with a small product team".to_string();
    j.required_skills = vec![
        required("JavaScript", Some(SkillLevel::Advanced)),
        required("React", Some(SkillLevel::Advanced)),
        required("TypeScript", Some(SkillLevel::Advanced)),
    ];
    j.experience_level = Some(ExperienceLevel::Senior);
    j.is_remote = true;
    j.location = "Remote".to_string();
    j.salary = Some(SalaryRange::new(130_000, 170_000));
    j
}
