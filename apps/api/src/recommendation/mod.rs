//! Job recommendation service: personalized ranked jobs, similar jobs and
//! trending jobs, with per-user caching and collaborative boosting.

pub mod context;
pub mod interactions;
pub mod ranking;
pub mod service;
pub mod similarity;

pub use interactions::InteractionLog;
pub use service::{RecommendationDeps, RecommendationPage, RecommendationService};
pub use similarity::InteractionOverlapSimilarity;
