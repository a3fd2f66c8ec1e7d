//! Stored state of an idempotency key

use gym_core::traits::Reservation;
use serde::{Deserialize, Serialize};

/// What a key currently guards
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum IdempotencyRecord {
    /// Claimed by a request that has not finished
    Pending { fingerprint: String },
    /// Finished; `response` is replayed for later requests
    Completed {
        fingerprint: String,
        response: serde_json::Value,
    },
}

impl IdempotencyRecord {
    pub fn pending(fingerprint: &str) -> Self {
        Self::Pending {
            fingerprint: fingerprint.to_string(),
        }
    }

    pub fn completed(fingerprint: &str, response: &serde_json::Value) -> Self {
        Self::Completed {
            fingerprint: fingerprint.to_string(),
            response: response.clone(),
        }
    }

    fn fingerprint(&self) -> &str {
        match self {
            Self::Pending { fingerprint } | Self::Completed { fingerprint, .. } => fingerprint,
        }
    }

    /// How a request with `fingerprint` arriving now should treat this record
    #[must_use]
    pub fn as_reservation(&self, fingerprint: &str) -> Reservation {
        if self.fingerprint() != fingerprint {
            return Reservation::Mismatch;
        }
        match self {
            Self::Pending { .. } => Reservation::InFlight,
            Self::Completed { response, .. } => Reservation::Completed(response.clone()),
        }
    }
}
