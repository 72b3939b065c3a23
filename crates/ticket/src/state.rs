//! Usage state shared by every ticket kind

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Lifecycle phase of a ticket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketPhase {
    /// Never used
    Fresh,
    /// Used at least once and still accepted by its policy
    Used,
    /// Terminal: the policy, an explicit destroy, or a dead grantor says so
    Expired,
}

impl fmt::Display for TicketPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TicketPhase::Fresh => "fresh",
            TicketPhase::Used => "used",
            TicketPhase::Expired => "expired",
        };
        f.write_str(name)
    }
}

/// Creation time and usage bookkeeping of a ticket
///
/// The only mutation is [`advance`](Self::advance): the use count never
/// decreases and `last_time_used` never moves backwards, even when the wall
/// clock does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketState {
    creation_time: DateTime<Utc>,
    last_time_used: DateTime<Utc>,
    previous_last_time_used: Option<DateTime<Utc>>,
    count_of_uses: u32,
}

impl TicketState {
    /// State of a ticket created at `now`
    #[must_use]
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            creation_time: now,
            last_time_used: now,
            previous_last_time_used: None,
            count_of_uses: 0,
        }
    }

    /// Rebuild a stored state verbatim
    #[must_use]
    pub fn from_parts(
        creation_time: DateTime<Utc>,
        last_time_used: DateTime<Utc>,
        previous_last_time_used: Option<DateTime<Utc>>,
        count_of_uses: u32,
    ) -> Self {
        Self {
            creation_time,
            last_time_used,
            previous_last_time_used,
            count_of_uses,
        }
    }

    /// Record one use at `now`
    pub fn advance(&mut self, now: DateTime<Utc>) {
        self.previous_last_time_used = Some(self.last_time_used);
        self.last_time_used = self.last_time_used.max(now);
        self.count_of_uses = self.count_of_uses.saturating_add(1);
    }

    #[must_use]
    pub fn creation_time(&self) -> DateTime<Utc> {
        self.creation_time
    }

    #[must_use]
    pub fn last_time_used(&self) -> DateTime<Utc> {
        self.last_time_used
    }

    #[must_use]
    pub fn previous_last_time_used(&self) -> Option<DateTime<Utc>> {
        self.previous_last_time_used
    }

    #[must_use]
    pub fn count_of_uses(&self) -> u32 {
        self.count_of_uses
    }

    /// Fresh or used, ignoring any expiration policy
    #[must_use]
    pub fn phase(&self) -> TicketPhase {
        if self.count_of_uses == 0 {
            TicketPhase::Fresh
        } else {
            TicketPhase::Used
        }
    }

    /// Time since creation, zero if `now` precedes it
    #[must_use]
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        elapsed(self.creation_time, now)
    }

    /// Time since the last use (or creation), zero if `now` precedes it
    #[must_use]
    pub fn idle_time(&self, now: DateTime<Utc>) -> Duration {
        elapsed(self.last_time_used, now)
    }
}

fn elapsed(since: DateTime<Utc>, now: DateTime<Utc>) -> Duration {
    (now - since).to_std().unwrap_or(Duration::ZERO)
}
