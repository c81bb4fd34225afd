use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::errors::AppError;
use crate::models::{CandidateProfile, JobProfile};
use crate::scoring::{MatchResult, MatchScorer};

#[derive(Debug, Clone, Copy)]
pub struct BatchOptions {
    /// Upper bound on concurrently running scoring tasks.
    pub max_workers: usize,
    /// Whole-batch deadline. Elapsing fails the batch with `Timeout`.
    pub timeout: Duration,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            max_workers: 4,
            timeout: Duration::from_millis(5_000),
        }
    }
}

/// Scores every (candidate, job) pair on a bounded pool of blocking tasks.
///
/// Results come back in candidate-major order: index `i * jobs.len() + j`
/// holds candidate `i` against job `j`, whatever order the workers finish in.
pub async fn batch_calculate_matches(
    scorer: Arc<dyn MatchScorer>,
    candidates: Arc<[CandidateProfile]>,
    jobs: Arc<[JobProfile]>,
    opts: BatchOptions,
) -> Result<Vec<MatchResult>, AppError> {
    let total = candidates.len() * jobs.len();
    if total == 0 {
        return Ok(Vec::new());
    }

    let workers = opts.max_workers.clamp(1, total);
    let chunk = total.div_ceil(workers);
    let cancelled = Arc::new(AtomicBool::new(false));
    debug!(total, workers, chunk, "batch scoring started");

    let run = {
        let cancelled = cancelled.clone();
        async move {
            let mut set = JoinSet::new();
            for start in (0..total).step_by(chunk) {
                let end = (start + chunk).min(total);
                let scorer = scorer.clone();
                let candidates = candidates.clone();
                let jobs = jobs.clone();
                let cancelled = cancelled.clone();
                set.spawn_blocking(move || {
                    let mut out = Vec::with_capacity(end - start);
                    for idx in start..end {
                        if cancelled.load(Ordering::Relaxed) {
                            break;
                        }
                        let (c, j) = (idx / jobs.len(), idx % jobs.len());
                        out.push(scorer.calculate_match(&candidates[c], &jobs[j]));
                    }
                    (start, out)
                });
            }

            let mut slots: Vec<Option<MatchResult>> = vec![None; total];
            while let Some(joined) = set.join_next().await {
                let (start, results) =
                    joined.map_err(|e| anyhow::anyhow!("scoring worker failed: {e}"))?;
                for (offset, result) in results.into_iter().enumerate() {
                    slots[start + offset] = Some(result?);
                }
            }
            slots
                .into_iter()
                .collect::<Option<Vec<_>>>()
                .ok_or_else(|| AppError::Internal(anyhow::anyhow!("batch left pairs unscored")))
        }
    };

    match tokio::time::timeout(opts.timeout, run).await {
        Ok(result) => result,
        Err(_) => {
            cancelled.store(true, Ordering::Relaxed);
            warn!(total, timeout_ms = opts.timeout.as_millis() as u64, "batch scoring timed out");
            Err(AppError::Timeout(opts.timeout.as_millis() as u64))
        }
    }
}
