//! Ticket lifecycle for tollgate
//!
//! A [`TicketGrantingTicket`] is the root credential of a login session. It
//! grants [`ServiceTicket`]s scoped to a single [`Service`], and every ticket
//! carries a [`TicketState`] that is advanced on use and judged by a shared
//! [`ExpirationPolicy`].
//!
//! Validation is a state transition, not a query: [`ServiceTicket::is_valid_for`]
//! consumes one use before it compares services, so a failed match still
//! spends the ticket. None of the types here synchronise concurrent
//! validators of the same ticket; that is the registry's job.
//!
//! [`Service`]: tollgate_core::Service

pub mod expiration;
pub mod granting;
pub mod record;
pub mod service_ticket;
pub mod state;
pub mod ticket;

pub use expiration::{
    create_expiration_policy, AnyOf, ExpirationPolicy, ExpirationPolicyConfig, HardTimeout,
    IdleTimeout, MultiUseOrTimeout, NeverExpires, SharedExpirationPolicy,
    ThrottledUseAndTimeout, TicketGrantingTicketPolicy,
};
pub use granting::{GrantingTicketRef, TicketGrantingTicket};
pub use record::{ServiceTicketRecord, TicketGrantingTicketRecord};
pub use service_ticket::{new_service_ticket, ServiceTicket, ServiceTicketBuilder};
pub use state::{TicketPhase, TicketState};
pub use ticket::{same_ticket, Ticket};
