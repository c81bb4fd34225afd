//! Redis pub/sub transport for domain events.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use redis::AsyncCommands;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::CacheStore;
use crate::errors::AppError;
use crate::events::{
    handle_domain_event, DomainEvent, EventPublisher, APPLICATION_SUBMITTED, PROFILE_UPDATED,
};
use crate::recommendation::interactions::InteractionLog;

const RESUBSCRIBE_DELAY: Duration = Duration::from_secs(5);
const INBOUND_CHANNELS: &[&str] = &[PROFILE_UPDATED, APPLICATION_SUBMITTED];

pub struct RedisEventPublisher {
    client: redis::Client,
}

impl RedisEventPublisher {
    pub fn new(client: redis::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl EventPublisher for RedisEventPublisher {
    async fn publish(&self, event: &DomainEvent) -> Result<(), AppError> {
        let payload = event.encode()?;
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let receivers: i64 = conn.publish(event.channel(), payload).await?;
        debug!(channel = event.channel(), receivers, "event published");
        Ok(())
    }
}

/// Consumes inbound events until the connection drops.
pub async fn run_event_subscriber<V>(
    client: &redis::Client,
    cache: &dyn CacheStore<V>,
    interactions: &InteractionLog,
) -> Result<(), AppError> {
    let mut pubsub = client.get_async_pubsub().await?;
    pubsub.subscribe(INBOUND_CHANNELS).await?;
    info!("Subscribed to {PROFILE_UPDATED} and {APPLICATION_SUBMITTED}");

    let mut messages = pubsub.on_message();
    while let Some(msg) = messages.next().await {
        let channel = msg.get_channel_name().to_string();
        let payload: String = match msg.get_payload() {
            Ok(p) => p,
            Err(e) => {
                warn!("Unreadable payload on {channel}: {e}");
                continue;
            }
        };
        match DomainEvent::decode(&channel, &payload) {
            Ok(event) => {
                handle_domain_event(cache, interactions, &event);
            }
            Err(e) => warn!("Ignoring event on {channel}: {e}"),
        }
    }
    Ok(())
}

/// Keeps a subscriber running, resubscribing after connection loss.
pub fn spawn_event_subscriber<V: 'static>(
    client: redis::Client,
    cache: Arc<dyn CacheStore<V>>,
    interactions: Arc<InteractionLog>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match run_event_subscriber(&client, cache.as_ref(), &interactions).await {
                Ok(()) => warn!("Event stream closed; resubscribing"),
                Err(e) => warn!("Event subscriber failed: {e}; retrying"),
            }
            tokio::time::sleep(RESUBSCRIBE_DELAY).await;
        }
    })
}
