//! Combination of policies

use crate::expiration::config::ExpirationPolicyConfig;
use crate::expiration::traits::{ExpirationPolicy, SharedExpirationPolicy};
use crate::state::TicketState;
use chrono::{DateTime, Utc};

/// Expired as soon as any member policy says so
///
/// An empty combination never expires.
#[derive(Debug, Clone, Default)]
pub struct AnyOf {
    policies: Vec<SharedExpirationPolicy>,
}

impl AnyOf {
    pub fn new(policies: Vec<SharedExpirationPolicy>) -> Self {
        Self { policies }
    }

    pub fn with(mut self, policy: SharedExpirationPolicy) -> Self {
        self.policies.push(policy);
        self
    }

    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }
}

impl ExpirationPolicy for AnyOf {
    fn is_expired(&self, state: &TicketState, now: DateTime<Utc>) -> bool {
        self.policies
            .iter()
            .any(|policy| policy.is_expired(state, now))
    }

    // Only describable when every member is.
    fn config(&self) -> Option<ExpirationPolicyConfig> {
        let policies = self
            .policies
            .iter()
            .map(|policy| policy.config())
            .collect::<Option<Vec<_>>>()?;
        Some(ExpirationPolicyConfig::AnyOf { policies })
    }
}
