//! Expiration policies deciding when a ticket stops being usable
//!
//! Policies are pure functions of a ticket's [`TicketState`] and the current
//! time. They hold no mutable state, so one instance is shared by every
//! ticket it governs.
//!
//! [`TicketState`]: crate::state::TicketState

mod config;
mod factory;
mod policies;
mod traits;

pub use config::ExpirationPolicyConfig;
pub use factory::create_expiration_policy;
pub use policies::{
    AnyOf, HardTimeout, IdleTimeout, MultiUseOrTimeout, NeverExpires, ThrottledUseAndTimeout,
    TicketGrantingTicketPolicy,
};
pub use traits::{ExpirationPolicy, SharedExpirationPolicy};
