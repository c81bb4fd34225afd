pub mod candidate;
pub mod job;
pub mod recommendation;

pub use candidate::{CandidateProfile, Experience, JobPreferences, Skill, SkillLevel};
pub use job::{
    CompanyInfo, EducationRequirement, ExperienceLevel, JobProfile, JobStatus, JobType,
    RequiredSkill, SalaryRange,
};
pub use recommendation::{
    JobRecommendation, JobSummary, PaginatedResponse, RecommendationFilters,
    RecommendationRequest, RecommendationSort, SimilarJob, TrendingJob, UserPreferences,
};
