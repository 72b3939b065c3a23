//! Idle timeout with a minimum spacing between uses

use crate::expiration::config::{whole_secs, ExpirationPolicyConfig};
use crate::expiration::traits::ExpirationPolicy;
use crate::state::TicketState;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Expires after `time_to_kill` of idleness, or once a use follows the one
/// before it within `time_between_uses`
///
/// The spacing is judged between recorded uses, so a ticket reused too soon
/// stays expired; waiting longer does not revive it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThrottledUseAndTimeout {
    time_to_kill: Duration,
    time_between_uses: Duration,
}

impl ThrottledUseAndTimeout {
    pub fn new(time_to_kill: Duration, time_between_uses: Duration) -> Self {
        Self {
            time_to_kill,
            time_between_uses,
        }
    }

    pub fn time_to_kill(&self) -> Duration {
        self.time_to_kill
    }

    pub fn time_between_uses(&self) -> Duration {
        self.time_between_uses
    }
}

impl ExpirationPolicy for ThrottledUseAndTimeout {
    fn is_expired(&self, state: &TicketState, now: DateTime<Utc>) -> bool {
        if state.idle_time(now) >= self.time_to_kill {
            return true;
        }
        // The first use is measured against creation, not against a use
        if state.count_of_uses() < 2 {
            return false;
        }
        state.previous_last_time_used().is_some_and(|previous| {
            (state.last_time_used() - previous)
                .to_std()
                .map_or(true, |gap| gap <= self.time_between_uses)
        })
    }

    fn config(&self) -> Option<ExpirationPolicyConfig> {
        Some(ExpirationPolicyConfig::ThrottledUseAndTimeout {
            time_to_kill_secs: whole_secs(self.time_to_kill)?,
            time_between_uses_secs: whole_secs(self.time_between_uses)?,
        })
    }
}
