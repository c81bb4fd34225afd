use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use crate::cache::CacheStore;

/// Periodically drops expired cache entries. Runs until the handle is aborted.
pub fn spawn_cache_sweeper<V: 'static>(
    cache: Arc<dyn CacheStore<V>>,
    every: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // the first tick completes immediately
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let removed = cache.sweep_expired();
            if removed > 0 {
                debug!(removed, remaining = cache.len(), "cache sweep");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheKey, ShardedTtlCache};
    use crate::clock::ManualClock;
    use crate::test_support::fixed_now;

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_clears_expired_entries_on_tick() {
        let clock = ManualClock::new(fixed_now());
        let cache: Arc<dyn CacheStore<u32>> =
            Arc::new(ShardedTtlCache::new(16, 2, Arc::new(clock.clone())));
        cache.set(
            CacheKey {
                user_id: "u1".into(),
                fingerprint: "f".into(),
            },
            7,
            Duration::from_secs(30),
        );

        let handle = spawn_cache_sweeper(cache.clone(), Duration::from_secs(60));
        tokio::task::yield_now().await;

        clock.advance(chrono::Duration::seconds(45));
        assert_eq!(cache.len(), 1);

        tokio::time::advance(Duration::from_secs(61)).await;
        for _ in 0..3 {
            tokio::task::yield_now().await;
        }
        assert_eq!(cache.len(), 0);

        handle.abort();
    }
}
