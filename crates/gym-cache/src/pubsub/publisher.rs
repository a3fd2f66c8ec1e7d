//! Redis Pub/Sub publisher.

use async_trait::async_trait;
use gym_core::traits::{EventPublisher, RepoResult};
use gym_core::DomainEvent;
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};

use crate::pool::{RedisPool, RedisResult};
use crate::pubsub::PubSubChannel;

/// Event wrapper for Pub/Sub messages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PubSubEvent {
    /// Event type name (e.g., "SERVICE_FROZEN")
    pub event_type: String,
    pub data: serde_json::Value,
}

impl PubSubEvent {
    #[must_use]
    pub fn new(event_type: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            event_type: event_type.into(),
            data,
        }
    }

    /// Wrap a domain event
    pub fn from_domain(event: &DomainEvent) -> Result<Self, serde_json::Error> {
        Ok(Self::new(event.event_type(), serde_json::to_value(event)?))
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Redis Pub/Sub publisher
#[derive(Clone)]
pub struct Publisher {
    pool: RedisPool,
}

impl Publisher {
    #[must_use]
    pub fn new(pool: RedisPool) -> Self {
        Self { pool }
    }

    /// Publish an event to a channel, returning the number of receivers
    pub async fn publish(&self, channel: &PubSubChannel, event: &PubSubEvent) -> RedisResult<u32> {
        self.publish_many(std::slice::from_ref(channel), event).await
    }

    /// Publish one event to several channels over a single connection
    pub async fn publish_many(
        &self,
        channels: &[PubSubChannel],
        event: &PubSubEvent,
    ) -> RedisResult<u32> {
        let payload = event.to_json()?;
        let mut conn = self.pool.connection().await?;
        let mut total_receivers = 0;

        for channel in channels {
            let receivers: u32 = conn.publish(channel.name(), &payload).await?;
            total_receivers += receivers;
        }

        tracing::debug!(
            channels = channels.len(),
            event_type = %event.event_type,
            total_receivers,
            "Published event"
        );

        Ok(total_receivers)
    }
}

/// [`EventPublisher`] sending each ledger event to the member's channel and
/// the ledger firehose
#[derive(Clone)]
pub struct RedisEventPublisher {
    publisher: Publisher,
}

impl RedisEventPublisher {
    #[must_use]
    pub fn new(pool: RedisPool) -> Self {
        Self {
            publisher: Publisher::new(pool),
        }
    }
}

#[async_trait]
impl EventPublisher for RedisEventPublisher {
    async fn publish(&self, event: &DomainEvent) -> RepoResult<()> {
        let wrapped = PubSubEvent::from_domain(event)
            .map_err(|e| gym_core::DomainError::InternalError(e.to_string()))?;
        let channels = [PubSubChannel::member(event.member_id()), PubSubChannel::Ledger];
        self.publisher.publish_many(&channels, &wrapped).await?;
        Ok(())
    }
}
