//! Use-count limited policy, the usual choice for service tickets

use crate::expiration::config::{whole_secs, ExpirationPolicyConfig};
use crate::expiration::traits::ExpirationPolicy;
use crate::state::TicketState;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Expires after `max_uses` uses or `time_to_kill` of idleness, whichever
/// comes first
///
/// `max_uses == 1` gives the classic single-use service ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MultiUseOrTimeout {
    max_uses: u32,
    time_to_kill: Duration,
}

impl MultiUseOrTimeout {
    pub fn new(max_uses: u32, time_to_kill: Duration) -> Self {
        Self {
            max_uses,
            time_to_kill,
        }
    }

    /// One use within `time_to_kill`
    pub fn single_use(time_to_kill: Duration) -> Self {
        Self::new(1, time_to_kill)
    }

    pub fn max_uses(&self) -> u32 {
        self.max_uses
    }

    pub fn time_to_kill(&self) -> Duration {
        self.time_to_kill
    }
}

impl ExpirationPolicy for MultiUseOrTimeout {
    fn is_expired(&self, state: &TicketState, now: DateTime<Utc>) -> bool {
        state.count_of_uses() >= self.max_uses || state.idle_time(now) >= self.time_to_kill
    }

    fn config(&self) -> Option<ExpirationPolicyConfig> {
        Some(ExpirationPolicyConfig::MultiUseOrTimeout {
            max_uses: self.max_uses,
            time_to_kill_secs: whole_secs(self.time_to_kill)?,
        })
    }
}
