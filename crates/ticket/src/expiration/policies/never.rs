//! Policy for tickets that never expire on their own

use crate::expiration::config::ExpirationPolicyConfig;
use crate::expiration::traits::ExpirationPolicy;
use crate::state::TicketState;
use chrono::{DateTime, Utc};

/// Never expires; only an explicit destroy ends the ticket
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NeverExpires;

impl ExpirationPolicy for NeverExpires {
    fn is_expired(&self, _state: &TicketState, _now: DateTime<Utc>) -> bool {
        false
    }

    fn config(&self) -> Option<ExpirationPolicyConfig> {
        Some(ExpirationPolicyConfig::NeverExpires)
    }
}
