//! Reconnect backoff policy.
//!
//! Linear backoff with a hard cap and a bounded number of automatic
//! attempts. Pure: no clock, no IO.

use serde::{Deserialize, Serialize};

/// Reconnect constants shared by the backoff function and the connection
/// manager's retry budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconnectPolicy {
    /// Automatic retries allowed after consecutive closes (default 5).
    pub max_attempts: u32,
    /// Delay unit multiplied by the attempt number (default 1000).
    pub base_delay_ms: u64,
    /// Upper bound for any single delay (default 10000).
    pub cap_ms: u64,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay_ms: 1_000,
            cap_ms: 10_000,
        }
    }
}

impl ReconnectPolicy {
    /// Delay before retry number `attempt` (1 = first retry).
    ///
    /// `min(base_delay_ms * attempt, cap_ms)`; attempt 0 yields 0.
    pub fn next_delay(&self, attempt: u32) -> u64 {
        self.base_delay_ms
            .saturating_mul(u64::from(attempt))
            .min(self.cap_ms)
    }
}
