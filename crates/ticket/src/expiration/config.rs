//! Serializable expiration policy descriptions

use super::policies::{
    AnyOf, HardTimeout, IdleTimeout, MultiUseOrTimeout, NeverExpires, ThrottledUseAndTimeout,
    TicketGrantingTicketPolicy,
};
use super::traits::SharedExpirationPolicy;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tollgate_core::{
    Error, Result, DEFAULT_SERVICE_TICKET_MAX_USES, DEFAULT_SERVICE_TICKET_TIME_TO_KILL_SECS,
    DEFAULT_TGT_MAX_TIME_TO_LIVE_SECS, DEFAULT_TGT_TIME_TO_KILL_SECS,
};

/// Configuration form of the built-in policies
///
/// Persisted tickets carry one of these as their policy reference, and
/// registry configuration files name policies with the same shape:
///
/// ```json
/// { "type": "multi_use_or_timeout", "max_uses": 1, "time_to_kill_secs": 10 }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExpirationPolicyConfig {
    NeverExpires,
    HardTimeout {
        time_to_kill_secs: u64,
    },
    IdleTimeout {
        time_to_kill_secs: u64,
    },
    MultiUseOrTimeout {
        max_uses: u32,
        time_to_kill_secs: u64,
    },
    ThrottledUseAndTimeout {
        time_to_kill_secs: u64,
        time_between_uses_secs: u64,
    },
    TicketGrantingTicket {
        max_time_to_live_secs: u64,
        time_to_kill_secs: u64,
    },
    AnyOf {
        policies: Vec<ExpirationPolicyConfig>,
    },
}

impl ExpirationPolicyConfig {
    /// Default for service tickets: one use within ten seconds
    #[must_use]
    pub fn service_ticket_default() -> Self {
        Self::MultiUseOrTimeout {
            max_uses: DEFAULT_SERVICE_TICKET_MAX_USES,
            time_to_kill_secs: DEFAULT_SERVICE_TICKET_TIME_TO_KILL_SECS,
        }
    }

    /// Default for ticket-granting tickets: eight hours, two hours idle
    #[must_use]
    pub fn ticket_granting_ticket_default() -> Self {
        Self::TicketGrantingTicket {
            max_time_to_live_secs: DEFAULT_TGT_MAX_TIME_TO_LIVE_SECS,
            time_to_kill_secs: DEFAULT_TGT_TIME_TO_KILL_SECS,
        }
    }

    /// Reject configurations under which every ticket is born expired
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::NeverExpires => Ok(()),
            Self::HardTimeout { time_to_kill_secs } | Self::IdleTimeout { time_to_kill_secs } => {
                non_zero("time_to_kill_secs", *time_to_kill_secs)
            }
            Self::MultiUseOrTimeout {
                max_uses,
                time_to_kill_secs,
            } => {
                non_zero("max_uses", u64::from(*max_uses))?;
                non_zero("time_to_kill_secs", *time_to_kill_secs)
            }
            Self::ThrottledUseAndTimeout {
                time_to_kill_secs,
                time_between_uses_secs,
            } => {
                non_zero("time_to_kill_secs", *time_to_kill_secs)?;
                if time_between_uses_secs >= time_to_kill_secs {
                    return Err(Error::configuration(format!(
                        "time_between_uses_secs ({time_between_uses_secs}) must be shorter than time_to_kill_secs ({time_to_kill_secs})"
                    )));
                }
                Ok(())
            }
            Self::TicketGrantingTicket {
                max_time_to_live_secs,
                time_to_kill_secs,
            } => {
                non_zero("max_time_to_live_secs", *max_time_to_live_secs)?;
                non_zero("time_to_kill_secs", *time_to_kill_secs)
            }
            Self::AnyOf { policies } => policies.iter().try_for_each(Self::validate),
        }
    }

    /// Instantiate the described policy without validating it
    #[must_use]
    pub fn build(&self) -> SharedExpirationPolicy {
        match self {
            Self::NeverExpires => Arc::new(NeverExpires),
            Self::HardTimeout { time_to_kill_secs } => {
                Arc::new(HardTimeout::new(secs(*time_to_kill_secs)))
            }
            Self::IdleTimeout { time_to_kill_secs } => {
                Arc::new(IdleTimeout::new(secs(*time_to_kill_secs)))
            }
            Self::MultiUseOrTimeout {
                max_uses,
                time_to_kill_secs,
            } => Arc::new(MultiUseOrTimeout::new(*max_uses, secs(*time_to_kill_secs))),
            Self::ThrottledUseAndTimeout {
                time_to_kill_secs,
                time_between_uses_secs,
            } => Arc::new(ThrottledUseAndTimeout::new(
                secs(*time_to_kill_secs),
                secs(*time_between_uses_secs),
            )),
            Self::TicketGrantingTicket {
                max_time_to_live_secs,
                time_to_kill_secs,
            } => Arc::new(TicketGrantingTicketPolicy::new(
                secs(*max_time_to_live_secs),
                secs(*time_to_kill_secs),
            )),
            Self::AnyOf { policies } => {
                Arc::new(AnyOf::new(policies.iter().map(Self::build).collect()))
            }
        }
    }
}

fn secs(value: u64) -> Duration {
    Duration::from_secs(value)
}

/// Whole seconds of `duration`, or `None` when it has a fractional part
/// that the configuration form cannot carry
pub(crate) fn whole_secs(duration: Duration) -> Option<u64> {
    (duration.subsec_nanos() == 0).then(|| duration.as_secs())
}

fn non_zero(field: &str, value: u64) -> Result<()> {
    if value == 0 {
        Err(Error::configuration(format!(
            "expiration policy field '{field}' must be greater than zero"
        )))
    } else {
        Ok(())
    }
}
