//! Factory for creating expiration policies

use super::config::ExpirationPolicyConfig;
use super::traits::SharedExpirationPolicy;
use tollgate_core::Result;
use tracing::debug;

/// Validate a policy description and instantiate it
pub fn create_expiration_policy(config: &ExpirationPolicyConfig) -> Result<SharedExpirationPolicy> {
    config.validate()?;
    debug!(policy = ?config, "creating expiration policy");
    Ok(config.build())
}
