//! Pub/Sub channel naming.

use gym_core::Snowflake;

/// Channel prefix for per-member events
pub const MEMBER_CHANNEL_PREFIX: &str = "gym:member:";
/// Channel carrying every ledger event
pub const LEDGER_CHANNEL: &str = "gym:ledger";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PubSubChannel {
    /// Events touching one member's services
    Member(Snowflake),
    /// All ledger events
    Ledger,
}

impl PubSubChannel {
    #[must_use]
    pub fn member(member_id: Snowflake) -> Self {
        Self::Member(member_id)
    }

    /// Get the Redis channel name
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            Self::Member(id) => format!("{MEMBER_CHANNEL_PREFIX}{id}"),
            Self::Ledger => LEDGER_CHANNEL.to_string(),
        }
    }
}

impl std::fmt::Display for PubSubChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name())
    }
}
