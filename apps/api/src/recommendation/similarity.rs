use std::collections::HashMap;
use std::sync::Arc;

use crate::recommendation::interactions::InteractionLog;

/// Collaborative signal: how strongly users like this one gravitate to each job.
pub trait SimilarityProvider: Send + Sync {
    /// Affinity in [0, 1] per job id. Jobs with no signal may be omitted.
    fn affinities(&self, user_id: &str, job_ids: &[String]) -> HashMap<String, f64>;
}

/// No collaborative signal.
#[cfg(test)]
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSimilarity;

#[cfg(test)]
impl SimilarityProvider for NoopSimilarity {
    fn affinities(&self, _user_id: &str, _job_ids: &[String]) -> HashMap<String, f64> {
        HashMap::new()
    }
}

/// Share of a user's neighbours (users with an application in common) who
/// also applied to the job.
pub struct InteractionOverlapSimilarity {
    log: Arc<InteractionLog>,
}

impl InteractionOverlapSimilarity {
    pub fn new(log: Arc<InteractionLog>) -> Self {
        Self { log }
    }
}

impl SimilarityProvider for InteractionOverlapSimilarity {
    fn affinities(&self, user_id: &str, job_ids: &[String]) -> HashMap<String, f64> {
        let (neighbours, hits) = self.log.co_applications(user_id, job_ids);
        if neighbours == 0 {
            return HashMap::new();
        }
        let n = neighbours as f64;
        hits.into_iter()
            .map(|(job_id, count)| (job_id, count as f64 / n))
            .collect()
    }
}
