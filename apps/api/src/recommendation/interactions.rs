use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, HashSet, VecDeque};
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Applications remembered per user; older ones fall off first.
pub const MAX_APPLIED_PER_USER: usize = 256;

#[derive(Debug, Default)]
struct UserInteractions {
    /// Oldest first.
    applied: VecDeque<String>,
    /// Recency stamp; the least recently active user is evicted first.
    touched: u64,
}

type Shard = RwLock<HashMap<String, UserInteractions>>;

/// In-process record of who applied where, sharded by user like the cache and
/// bounded in both users and applications per user.
pub struct InteractionLog {
    shards: Vec<Shard>,
    per_shard_capacity: usize,
    clock: AtomicU64,
}

impl InteractionLog {
    pub fn new(shard_count: usize, capacity: usize) -> Self {
        let shard_count = shard_count.max(1);
        Self {
            shards: (0..shard_count).map(|_| RwLock::new(HashMap::new())).collect(),
            per_shard_capacity: capacity.div_ceil(shard_count).max(1),
            clock: AtomicU64::new(0),
        }
    }

    fn shard(&self, user_id: &str) -> &Shard {
        let mut hasher = DefaultHasher::new();
        user_id.hash(&mut hasher);
        &self.shards[(hasher.finish() as usize) % self.shards.len()]
    }

    fn read(shard: &Shard) -> RwLockReadGuard<'_, HashMap<String, UserInteractions>> {
        shard.read().unwrap_or_else(|p| p.into_inner())
    }

    fn write(shard: &Shard) -> RwLockWriteGuard<'_, HashMap<String, UserInteractions>> {
        shard.write().unwrap_or_else(|p| p.into_inner())
    }

    fn tick(&self) -> u64 {
        self.clock.fetch_add(1, Ordering::Relaxed)
    }

    /// Marks a user who was just served recommendations as active, so their
    /// applications outlive those of idle users. Users with no applications
    /// are not stored.
    pub fn record_recommended(&self, user_id: &str) {
        let stamp = self.tick();
        if let Some(entry) = Self::write(self.shard(user_id)).get_mut(user_id) {
            entry.touched = stamp;
        }
    }

    pub fn record_applied(&self, user_id: &str, job_id: &str) {
        let stamp = self.tick();
        let mut map = Self::write(self.shard(user_id));
        if !map.contains_key(user_id) && map.len() >= self.per_shard_capacity {
            let idle = map
                .iter()
                .min_by_key(|(_, i)| i.touched)
                .map(|(user, _)| user.clone());
            if let Some(idle) = idle {
                map.remove(&idle);
            }
        }
        let entry = map.entry(user_id.to_string()).or_default();
        entry.touched = stamp;
        if !entry.applied.iter().any(|j| j == job_id) {
            if entry.applied.len() >= MAX_APPLIED_PER_USER {
                entry.applied.pop_front();
            }
            entry.applied.push_back(job_id.to_string());
        }
    }

    pub fn applied(&self, user_id: &str) -> HashSet<String> {
        Self::read(self.shard(user_id))
            .get(user_id)
            .map(|i| i.applied.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Number of neighbours (other users sharing an application with
    /// `user_id`) and, per job in `job_ids`, how many of them applied to it.
    pub fn co_applications(
        &self,
        user_id: &str,
        job_ids: &[String],
    ) -> (usize, HashMap<String, usize>) {
        let mine = self.applied(user_id);
        let mut hits: HashMap<String, usize> = HashMap::new();
        if mine.is_empty() {
            return (0, hits);
        }
        let wanted: HashSet<&str> = job_ids.iter().map(String::as_str).collect();
        let mut neighbours = 0;
        for shard in &self.shards {
            let map = Self::read(shard);
            for (other, interactions) in map.iter() {
                if other == user_id || !interactions.applied.iter().any(|j| mine.contains(j)) {
                    continue;
                }
                neighbours += 1;
                for job_id in interactions.applied.iter() {
                    if wanted.contains(job_id.as_str()) {
                        *hits.entry(job_id.clone()).or_default() += 1;
                    }
                }
            }
        }
        (neighbours, hits)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.shards.iter().map(|s| Self::read(s).len()).sum()
    }
}
