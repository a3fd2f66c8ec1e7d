//! Event publisher that only writes to the log

use async_trait::async_trait;
use gym_core::traits::{EventPublisher, RepoResult};
use gym_core::DomainEvent;
use tracing::info;

/// Records ledger events as structured log lines
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingEventPublisher;

#[async_trait]
impl EventPublisher for LoggingEventPublisher {
    async fn publish(&self, event: &DomainEvent) -> RepoResult<()> {
        info!(
            event_type = event.event_type(),
            member_id = %event.member_id(),
            timestamp = %event.timestamp(),
            "Ledger event"
        );
        Ok(())
    }
}
