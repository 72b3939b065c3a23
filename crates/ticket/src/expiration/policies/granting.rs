//! Session policy for ticket-granting tickets

use crate::expiration::config::{whole_secs, ExpirationPolicyConfig};
use crate::expiration::traits::ExpirationPolicy;
use crate::state::TicketState;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Expires when older than `max_time_to_live` or idle for `time_to_kill`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TicketGrantingTicketPolicy {
    max_time_to_live: Duration,
    time_to_kill: Duration,
}

impl TicketGrantingTicketPolicy {
    pub fn new(max_time_to_live: Duration, time_to_kill: Duration) -> Self {
        Self {
            max_time_to_live,
            time_to_kill,
        }
    }

    pub fn max_time_to_live(&self) -> Duration {
        self.max_time_to_live
    }

    pub fn time_to_kill(&self) -> Duration {
        self.time_to_kill
    }
}

impl ExpirationPolicy for TicketGrantingTicketPolicy {
    fn is_expired(&self, state: &TicketState, now: DateTime<Utc>) -> bool {
        state.age(now) >= self.max_time_to_live || state.idle_time(now) >= self.time_to_kill
    }

    fn config(&self) -> Option<ExpirationPolicyConfig> {
        Some(ExpirationPolicyConfig::TicketGrantingTicket {
            max_time_to_live_secs: whole_secs(self.max_time_to_live)?,
            time_to_kill_secs: whole_secs(self.time_to_kill)?,
        })
    }
}
