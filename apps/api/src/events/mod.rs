//! Domain events. Inbound events invalidate cached recommendations; the
//! service publishes `recommendation_generated` after each fresh computation.

pub mod redis_bus;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::cache::CacheStore;
use crate::errors::AppError;
use crate::recommendation::interactions::InteractionLog;

pub const PROFILE_UPDATED: &str = "profile_updated";
pub const APPLICATION_SUBMITTED: &str = "application_submitted";
pub const RECOMMENDATION_GENERATED: &str = "recommendation_generated";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdated {
    pub user_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationSubmitted {
    pub user_id: String,
    #[serde(default)]
    pub job_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationGenerated {
    pub user_id: String,
    /// Every job that cleared the score threshold, in rank order across all pages.
    pub job_ids: Vec<String>,
    pub total: usize,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DomainEvent {
    ProfileUpdated(ProfileUpdated),
    ApplicationSubmitted(ApplicationSubmitted),
    RecommendationGenerated(RecommendationGenerated),
}

impl DomainEvent {
    pub fn channel(&self) -> &'static str {
        match self {
            DomainEvent::ProfileUpdated(_) => PROFILE_UPDATED,
            DomainEvent::ApplicationSubmitted(_) => APPLICATION_SUBMITTED,
            DomainEvent::RecommendationGenerated(_) => RECOMMENDATION_GENERATED,
        }
    }

    pub fn user_id(&self) -> &str {
        match self {
            DomainEvent::ProfileUpdated(e) => &e.user_id,
            DomainEvent::ApplicationSubmitted(e) => &e.user_id,
            DomainEvent::RecommendationGenerated(e) => &e.user_id,
        }
    }

    /// Decodes a message received on `channel`.
    pub fn decode(channel: &str, payload: &str) -> Result<Self, AppError> {
        let bad = |e: serde_json::Error| {
            AppError::InvalidInput(format!("malformed {channel} payload: {e}"))
        };
        let event = match channel {
            PROFILE_UPDATED => {
                DomainEvent::ProfileUpdated(serde_json::from_str(payload).map_err(bad)?)
            }
            APPLICATION_SUBMITTED => {
                DomainEvent::ApplicationSubmitted(serde_json::from_str(payload).map_err(bad)?)
            }
            RECOMMENDATION_GENERATED => {
                DomainEvent::RecommendationGenerated(serde_json::from_str(payload).map_err(bad)?)
            }
            other => return Err(AppError::InvalidInput(format!("unknown channel '{other}'"))),
        };
        if event.user_id().trim().is_empty() {
            return Err(AppError::InvalidInput(format!("{channel} event without userId")));
        }
        Ok(event)
    }

    pub fn encode(&self) -> Result<String, AppError> {
        let encoded = match self {
            DomainEvent::ProfileUpdated(e) => serde_json::to_string(e),
            DomainEvent::ApplicationSubmitted(e) => serde_json::to_string(e),
            DomainEvent::RecommendationGenerated(e) => serde_json::to_string(e),
        };
        encoded.map_err(|e| AppError::Internal(e.into()))
    }
}

#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, event: &DomainEvent) -> Result<(), AppError>;
}

/// Drops every event.
#[cfg(test)]
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopPublisher;

#[cfg(test)]
#[async_trait]
impl EventPublisher for NoopPublisher {
    async fn publish(&self, event: &DomainEvent) -> Result<(), AppError> {
        tracing::debug!(channel = event.channel(), "event dropped (no publisher)");
        Ok(())
    }
}

/// Applies an inbound event: profile and application changes invalidate the
/// user's cached recommendations. Returns how many cache entries were dropped.
pub fn handle_domain_event<V>(
    cache: &dyn CacheStore<V>,
    interactions: &InteractionLog,
    event: &DomainEvent,
) -> usize {
    match event {
        DomainEvent::ProfileUpdated(e) => {
            let removed = cache.invalidate_for_user(&e.user_id);
            info!(user_id = %e.user_id, removed, "profile updated; recommendations invalidated");
            removed
        }
        DomainEvent::ApplicationSubmitted(e) => {
            if let Some(job_id) = &e.job_id {
                interactions.record_applied(&e.user_id, job_id);
            }
            let removed = cache.invalidate_for_user(&e.user_id);
            info!(user_id = %e.user_id, removed, "application submitted; recommendations invalidated");
            removed
        }
        DomainEvent::RecommendationGenerated(_) => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheKey, ShardedTtlCache};
    use crate::clock::ManualClock;
    use crate::test_support::fixed_now;
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn test_decode_camel_case_payload() {
        let e = DomainEvent::decode(PROFILE_UPDATED, r#"{"userId":"u1"}"#).unwrap();
        assert_eq!(e.user_id(), "u1");

        let e = DomainEvent::decode(APPLICATION_SUBMITTED, r#"{"userId":"u1","jobId":"j7"}"#)
            .unwrap();
        assert_eq!(
            e,
            DomainEvent::ApplicationSubmitted(ApplicationSubmitted {
                user_id: "u1".into(),
                job_id: Some("j7".into()),
            })
        );
    }

    #[test]
    fn test_decode_rejects_garbage_and_unknown_channels() {
        assert!(DomainEvent::decode(PROFILE_UPDATED, "{}").is_err());
        assert!(DomainEvent::decode(PROFILE_UPDATED, r#"{"userId":""}"#).is_err());
        assert!(DomainEvent::decode("weather", r#"{"userId":"u1"}"#).is_err());
    }

    #[test]
    fn test_encode_uses_camel_case() {
        let e = DomainEvent::RecommendationGenerated(RecommendationGenerated {
            user_id: "u1".into(),
            job_ids: vec!["j1".into()],
            total: 1,
            generated_at: fixed_now(),
        });
        let json = e.encode().unwrap();
        assert!(json.contains("\"userId\":\"u1\""));
        assert!(json.contains("\"jobIds\""));
    }

    #[test]
    fn test_profile_and_application_events_invalidate_cache() {
        let cache = ShardedTtlCache::<u8>::new(10, 2, Arc::new(ManualClock::new(fixed_now())));
        let log = InteractionLog::new(2, 100);
        let key = |u: &str| CacheKey {
            user_id: u.into(),
            fingerprint: "f".into(),
        };
        cache.set(key("u1"), 1, Duration::from_secs(60));
        cache.set(key("u2"), 2, Duration::from_secs(60));

        let removed = handle_domain_event::<u8>(
            &cache,
            &log,
            &DomainEvent::ProfileUpdated(ProfileUpdated { user_id: "u1".into() }),
        );
        assert_eq!(removed, 1);
        assert!(cache.get(&key("u1")).is_none());
        assert!(cache.get(&key("u2")).is_some());

        handle_domain_event::<u8>(
            &cache,
            &log,
            &DomainEvent::ApplicationSubmitted(ApplicationSubmitted {
                user_id: "u2".into(),
                job_id: Some("j3".into()),
            }),
        );
        assert!(cache.get(&key("u2")).is_none());
        assert!(log.applied("u2").contains("j3"));
    }
}
