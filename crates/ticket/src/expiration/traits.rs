//! Core expiration policy trait definition

use super::config::ExpirationPolicyConfig;
use crate::state::TicketState;
use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;

/// Expiration policy trait
pub trait ExpirationPolicy: fmt::Debug + Send + Sync {
    /// Whether a ticket in `state` is expired at `now`
    fn is_expired(&self, state: &TicketState, now: DateTime<Utc>) -> bool;

    /// Serializable description of this policy
    ///
    /// `None` when the policy cannot be described exactly; restoring from a
    /// lossy description would change when tickets expire.
    fn config(&self) -> Option<ExpirationPolicyConfig> {
        None
    }
}

/// Policy handle shared across tickets
pub type SharedExpirationPolicy = Arc<dyn ExpirationPolicy>;
