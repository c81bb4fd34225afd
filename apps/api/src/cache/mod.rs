//! Recommendation cache. Keyed per user so invalidation never touches
//! another user's entries.

pub mod sharded;
pub mod sweeper;

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::errors::AppError;
use crate::models::{RecommendationFilters, RecommendationRequest, RecommendationSort};

pub use sharded::ShardedTtlCache;
pub use sweeper::spawn_cache_sweeper;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub user_id: String,
    /// Hex SHA-256 of the request's filters, sort, limit and page.
    pub fingerprint: String,
}

#[derive(Serialize)]
struct FingerprintInput<'a> {
    filters: &'a RecommendationFilters,
    sort: RecommendationSort,
    limit: usize,
    page: usize,
}

impl CacheKey {
    pub fn for_request(user_id: &str, request: &RecommendationRequest) -> Result<Self, AppError> {
        let input = FingerprintInput {
            filters: &request.filters,
            sort: request.sort,
            limit: request.limit,
            page: request.page,
        };
        let bytes = serde_json::to_vec(&input).map_err(|e| AppError::Internal(e.into()))?;
        Ok(Self {
            user_id: user_id.to_string(),
            fingerprint: format!("{:x}", Sha256::digest(&bytes)),
        })
    }
}

/// Bookkeeping the eviction policy sees for each live entry.
#[derive(Debug, Clone, Copy)]
pub struct EntryMeta {
    pub expires_at: DateTime<Utc>,
    /// Monotonic insertion counter; breaks ties between equal timestamps.
    pub seq: u64,
}

/// Picks which entry to drop when a shard is full.
pub trait EvictionPolicy: Send + Sync {
    fn victim<'a>(
        &self,
        entries: &mut dyn Iterator<Item = (&'a CacheKey, &'a EntryMeta)>,
    ) -> Option<&'a CacheKey>;
}

/// Evicts whatever was inserted first. Approximate globally, exact per shard.
#[derive(Debug, Clone, Copy, Default)]
pub struct OldestInsertionFirst;

impl EvictionPolicy for OldestInsertionFirst {
    fn victim<'a>(
        &self,
        entries: &mut dyn Iterator<Item = (&'a CacheKey, &'a EntryMeta)>,
    ) -> Option<&'a CacheKey> {
        entries.min_by_key(|(_, meta)| meta.seq).map(|(key, _)| key)
    }
}

/// Key-value cache with per-entry TTL and per-user invalidation.
///
/// Every invalidation moves the user's generation forward. A writer that read
/// the generation before computing stores through `set_if_generation`, so a
/// value computed across an invalidation is never cached.
pub trait CacheStore<V>: Send + Sync {
    /// Live value for `key`. Expired entries are removed on read.
    fn get(&self, key: &CacheKey) -> Option<V>;
    fn set(&self, key: CacheKey, value: V, ttl: Duration);
    /// Current invalidation generation of `user_id`.
    fn generation(&self, user_id: &str) -> u64;
    /// Stores `value` only while `key.user_id` is still at `generation`.
    /// Returns whether the value was stored.
    fn set_if_generation(
        &self,
        key: CacheKey,
        value: V,
        ttl: Duration,
        generation: u64,
    ) -> bool;
    /// Drops every entry for `user_id` and advances its generation; returns
    /// how many entries were removed.
    fn invalidate_for_user(&self, user_id: &str) -> usize;
    /// Drops every expired entry; returns how many were removed.
    fn sweep_expired(&self) -> usize;
    /// Stored entries, including expired ones not yet swept.
    fn len(&self) -> usize;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_is_stable() {
        let req = RecommendationRequest::default();
        let a = CacheKey::for_request("u1", &req).unwrap();
        let b = CacheKey::for_request("u1", &req).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.fingerprint.len(), 64);
    }

    #[test]
    fn test_fingerprint_varies_with_request_shape() {
        let base = RecommendationRequest::default();
        let key = |r: &RecommendationRequest| CacheKey::for_request("u1", r).unwrap().fingerprint;

        let mut paged = base.clone();
        paged.page = 2;
        let mut sorted = base.clone();
        sorted.sort = RecommendationSort::Recent;
        let mut filtered = base.clone();
        filtered.filters.remote_only = true;

        assert_ne!(key(&base), key(&paged));
        assert_ne!(key(&base), key(&sorted));
        assert_ne!(key(&base), key(&filtered));
    }

    #[test]
    fn test_deadline_override_shares_cache_entry() {
        let base = RecommendationRequest::default();
        let mut hurried = base.clone();
        hurried.timeout_ms = Some(100);
        assert_eq!(
            CacheKey::for_request("u1", &base).unwrap(),
            CacheKey::for_request("u1", &hurried).unwrap()
        );
    }

    #[test]
    fn test_oldest_insertion_is_victim() {
        let now = Utc::now();
        let meta = |seq| EntryMeta {
            expires_at: now,
            seq,
        };
        let k1 = CacheKey {
            user_id: "a".into(),
            fingerprint: "1".into(),
        };
        let k2 = CacheKey {
            user_id: "a".into(),
            fingerprint: "2".into(),
        };
        let entries = vec![(k2.clone(), meta(7)), (k1.clone(), meta(3))];
        let mut iter = entries.iter().map(|(k, m)| (k, m));
        assert_eq!(OldestInsertionFirst.victim(&mut iter), Some(&k1));
    }
}
