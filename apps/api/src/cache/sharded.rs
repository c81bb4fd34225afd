use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use tracing::{debug, warn};

use crate::cache::{CacheKey, CacheStore, EntryMeta, EvictionPolicy, OldestInsertionFirst};
use crate::clock::Clock;

struct Entry<V> {
    value: V,
    meta: EntryMeta,
}

struct ShardState<V> {
    entries: HashMap<CacheKey, Entry<V>>,
    /// Generation of each recently invalidated user.
    generations: HashMap<String, u64>,
    /// Generation reported for users without a record. Raised to the largest
    /// pruned record, so a user's generation never moves backwards.
    floor: u64,
}

impl<V> ShardState<V> {
    fn new() -> Self {
        Self {
            entries: HashMap::new(),
            generations: HashMap::new(),
            floor: 0,
        }
    }

    fn generation(&self, user_id: &str) -> u64 {
        self.generations.get(user_id).copied().unwrap_or(self.floor)
    }

    /// Forgets generation records of users with nothing cached.
    fn prune_generations(&mut self) {
        let cached: HashSet<&str> = self.entries.keys().map(|k| k.user_id.as_str()).collect();
        let mut floor = self.floor;
        self.generations.retain(|user_id, generation| {
            let live = cached.contains(user_id.as_str());
            if !live {
                floor = floor.max(*generation);
            }
            live
        });
        self.floor = floor;
    }
}

type Shard<V> = RwLock<ShardState<V>>;

/// TTL cache split into independently locked shards. A user's entries all
/// live in one shard, so invalidating a user locks nothing else.
///
/// A poisoned shard is logged and behaves as empty: reads miss, writes are
/// dropped, and callers fall back to computing.
pub struct ShardedTtlCache<V> {
    shards: Vec<Shard<V>>,
    per_shard_capacity: usize,
    clock: Arc<dyn Clock>,
    policy: Box<dyn EvictionPolicy>,
    seq: AtomicU64,
    generation: AtomicU64,
}

impl<V: Clone + Send + Sync> ShardedTtlCache<V> {
    pub fn new(capacity: usize, shard_count: usize, clock: Arc<dyn Clock>) -> Self {
        Self::with_policy(capacity, shard_count, clock, Box::new(OldestInsertionFirst))
    }

    pub fn with_policy(
        capacity: usize,
        shard_count: usize,
        clock: Arc<dyn Clock>,
        policy: Box<dyn EvictionPolicy>,
    ) -> Self {
        let shard_count = shard_count.max(1);
        Self {
            shards: (0..shard_count).map(|_| RwLock::new(ShardState::new())).collect(),
            per_shard_capacity: capacity.div_ceil(shard_count).max(1),
            clock,
            policy,
            seq: AtomicU64::new(0),
            generation: AtomicU64::new(0),
        }
    }

    fn shard_for(&self, user_id: &str) -> &Shard<V> {
        let mut hasher = DefaultHasher::new();
        user_id.hash(&mut hasher);
        &self.shards[(hasher.finish() as usize) % self.shards.len()]
    }

    fn read(shard: &Shard<V>) -> Option<RwLockReadGuard<'_, ShardState<V>>> {
        match shard.read() {
            Ok(guard) => Some(guard),
            Err(_) => {
                warn!("cache shard lock poisoned; treating as miss");
                None
            }
        }
    }

    fn write(shard: &Shard<V>) -> Option<RwLockWriteGuard<'_, ShardState<V>>> {
        match shard.write() {
            Ok(guard) => Some(guard),
            Err(_) => {
                warn!("cache shard lock poisoned; skipping write");
                None
            }
        }
    }

    fn insert(&self, state: &mut ShardState<V>, key: CacheKey, value: V, meta: EntryMeta) {
        let map = &mut state.entries;
        if !map.contains_key(&key) && map.len() >= self.per_shard_capacity {
            let victim = self
                .policy
                .victim(&mut map.iter().map(|(k, e)| (k, &e.meta)))
                .cloned();
            if let Some(victim) = victim {
                map.remove(&victim);
                debug!(user_id = %victim.user_id, "cache shard full; evicted entry");
            }
        }
        map.insert(key, Entry { value, meta });
    }

    fn meta_for(&self, ttl: Duration) -> Option<EntryMeta> {
        let Ok(ttl) = chrono::Duration::from_std(ttl) else {
            warn!(?ttl, "cache ttl out of range; entry not stored");
            return None;
        };
        Some(EntryMeta {
            expires_at: self.clock.now() + ttl,
            seq: self.seq.fetch_add(1, Ordering::Relaxed),
        })
    }
}

impl<V: Clone + Send + Sync> CacheStore<V> for ShardedTtlCache<V> {
    fn get(&self, key: &CacheKey) -> Option<V> {
        let shard = self.shard_for(&key.user_id);
        let now = self.clock.now();
        {
            let state = Self::read(shard)?;
            match state.entries.get(key) {
                None => return None,
                Some(entry) if entry.meta.expires_at > now => return Some(entry.value.clone()),
                Some(_) => {}
            }
        }
        // expired: upgrade and remove, unless someone refreshed it meanwhile
        let mut state = Self::write(shard)?;
        if state.entries.get(key).is_some_and(|e| e.meta.expires_at <= now) {
            state.entries.remove(key);
            debug!(user_id = %key.user_id, "expired cache entry dropped on read");
        }
        None
    }

    fn set(&self, key: CacheKey, value: V, ttl: Duration) {
        let Some(meta) = self.meta_for(ttl) else {
            return;
        };
        if let Some(mut state) = Self::write(self.shard_for(&key.user_id)) {
            self.insert(&mut state, key, value, meta);
        }
    }

    fn generation(&self, user_id: &str) -> u64 {
        Self::read(self.shard_for(user_id))
            .map(|state| state.generation(user_id))
            .unwrap_or(u64::MAX)
    }

    fn set_if_generation(
        &self,
        key: CacheKey,
        value: V,
        ttl: Duration,
        generation: u64,
    ) -> bool {
        let Some(meta) = self.meta_for(ttl) else {
            return false;
        };
        let Some(mut state) = Self::write(self.shard_for(&key.user_id)) else {
            return false;
        };
        if state.generation(&key.user_id) != generation {
            debug!(user_id = %key.user_id, "user invalidated while computing; not cached");
            return false;
        }
        self.insert(&mut state, key, value, meta);
        true
    }

    fn invalidate_for_user(&self, user_id: &str) -> usize {
        let Some(mut state) = Self::write(self.shard_for(user_id)) else {
            return 0;
        };
        let generation = self.generation.fetch_add(1, Ordering::Relaxed) + 1;
        state.generations.insert(user_id.to_string(), generation);
        let before = state.entries.len();
        state.entries.retain(|k, _| k.user_id != user_id);
        before - state.entries.len()
    }

    fn sweep_expired(&self) -> usize {
        let now = self.clock.now();
        self.shards
            .iter()
            .filter_map(|shard| Self::write(shard))
            .map(|mut state| {
                let before = state.entries.len();
                state.entries.retain(|_, e| e.meta.expires_at > now);
                state.prune_generations();
                before - state.entries.len()
            })
            .sum()
    }

    fn len(&self) -> usize {
        self.shards
            .iter()
            .filter_map(|shard| Self::read(shard))
            .map(|state| state.entries.len())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::test_support::fixed_now;

    fn key(user: &str, fp: &str) -> CacheKey {
        CacheKey {
            user_id: user.to_string(),
            fingerprint: fp.to_string(),
        }
    }

    fn cache(capacity: usize, shards: usize) -> (ShardedTtlCache<String>, ManualClock) {
        let clock = ManualClock::new(fixed_now());
        (
            ShardedTtlCache::new(capacity, shards, Arc::new(clock.clone())),
            clock,
        )
    }

    const TTL: Duration = Duration::from_secs(900);

    #[test]
    fn test_set_then_get_round_trips() {
        let (c, _) = cache(100, 4);
        c.set(key("u1", "a"), "page-1".to_string(), TTL);
        assert_eq!(c.get(&key("u1", "a")), Some("page-1".to_string()));
        assert_eq!(c.get(&key("u1", "b")), None);
    }

    #[test]
    fn test_invalidate_only_touches_that_user() {
        let (c, _) = cache(100, 4);
        c.set(key("u1", "a"), "x".into(), TTL);
        c.set(key("u1", "b"), "y".into(), TTL);
        c.set(key("u2", "a"), "z".into(), TTL);

        assert_eq!(c.invalidate_for_user("u1"), 2);
        assert_eq!(c.get(&key("u1", "a")), None);
        assert_eq!(c.get(&key("u2", "a")), Some("z".to_string()));
    }

    #[test]
    fn test_expired_entries_miss_and_are_dropped() {
        let (c, clock) = cache(100, 4);
        c.set(key("u1", "a"), "x".into(), TTL);
        clock.advance(chrono::Duration::seconds(899));
        assert!(c.get(&key("u1", "a")).is_some());
        clock.advance(chrono::Duration::seconds(1));
        assert!(c.get(&key("u1", "a")).is_none());
        assert_eq!(c.len(), 0);
    }

    #[test]
    fn test_sweep_removes_only_expired() {
        let (c, clock) = cache(100, 4);
        c.set(key("u1", "short"), "x".into(), Duration::from_secs(10));
        c.set(key("u2", "long"), "y".into(), TTL);
        clock.advance(chrono::Duration::seconds(60));
        assert_eq!(c.sweep_expired(), 1);
        assert_eq!(c.len(), 1);
    }

    #[test]
    fn test_full_shard_evicts_oldest_insertion() {
        let (c, _) = cache(2, 1);
        c.set(key("u1", "first"), "1".into(), TTL);
        c.set(key("u2", "second"), "2".into(), TTL);
        c.set(key("u3", "third"), "3".into(), TTL);
        assert_eq!(c.len(), 2);
        assert_eq!(c.get(&key("u1", "first")), None);
        assert!(c.get(&key("u3", "third")).is_some());
    }

    #[test]
    fn test_overwrite_does_not_evict() {
        let (c, _) = cache(2, 1);
        c.set(key("u1", "a"), "1".into(), TTL);
        c.set(key("u2", "b"), "2".into(), TTL);
        c.set(key("u1", "a"), "1b".into(), TTL);
        assert_eq!(c.len(), 2);
        assert_eq!(c.get(&key("u1", "a")), Some("1b".to_string()));
    }

    #[test]
    fn test_write_after_invalidation_is_dropped() {
        let (c, _) = cache(100, 4);
        let seen = c.generation("u1");
        c.invalidate_for_user("u1");
        assert!(!c.set_if_generation(key("u1", "a"), "stale".into(), TTL, seen));
        assert_eq!(c.get(&key("u1", "a")), None);

        let current = c.generation("u1");
        assert!(c.set_if_generation(key("u1", "a"), "fresh".into(), TTL, current));
        assert_eq!(c.get(&key("u1", "a")), Some("fresh".to_string()));
    }

    #[test]
    fn test_invalidation_leaves_other_generations_alone() {
        let (c, _) = cache(100, 1);
        let other = c.generation("u2");
        c.invalidate_for_user("u1");
        assert_eq!(c.generation("u2"), other);
        assert!(c.set_if_generation(key("u2", "a"), "x".into(), TTL, other));
    }

    #[test]
    fn test_generation_survives_pruning() {
        let (c, clock) = cache(100, 1);
        let seen = c.generation("u1");
        c.invalidate_for_user("u1");
        let bumped = c.generation("u1");
        assert!(bumped > seen);

        clock.advance(chrono::Duration::seconds(1));
        c.sweep_expired();
        assert!(c.generation("u1") >= bumped);
        assert!(!c.set_if_generation(key("u1", "a"), "stale".into(), TTL, seen));
    }
}
