//! Time-to-live policies measured from creation or from last use

use crate::expiration::config::{whole_secs, ExpirationPolicyConfig};
use crate::expiration::traits::ExpirationPolicy;
use crate::state::TicketState;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Expires a fixed time after creation, regardless of use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HardTimeout {
    time_to_kill: Duration,
}

impl HardTimeout {
    pub fn new(time_to_kill: Duration) -> Self {
        Self { time_to_kill }
    }

    pub fn time_to_kill(&self) -> Duration {
        self.time_to_kill
    }
}

impl ExpirationPolicy for HardTimeout {
    fn is_expired(&self, state: &TicketState, now: DateTime<Utc>) -> bool {
        state.age(now) >= self.time_to_kill
    }

    fn config(&self) -> Option<ExpirationPolicyConfig> {
        Some(ExpirationPolicyConfig::HardTimeout {
            time_to_kill_secs: whole_secs(self.time_to_kill)?,
        })
    }
}

/// Expires after a period without use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdleTimeout {
    time_to_kill: Duration,
}

impl IdleTimeout {
    pub fn new(time_to_kill: Duration) -> Self {
        Self { time_to_kill }
    }

    pub fn time_to_kill(&self) -> Duration {
        self.time_to_kill
    }
}

impl ExpirationPolicy for IdleTimeout {
    fn is_expired(&self, state: &TicketState, now: DateTime<Utc>) -> bool {
        state.idle_time(now) >= self.time_to_kill
    }

    fn config(&self) -> Option<ExpirationPolicyConfig> {
        Some(ExpirationPolicyConfig::IdleTimeout {
            time_to_kill_secs: whole_secs(self.time_to_kill)?,
        })
    }
}
