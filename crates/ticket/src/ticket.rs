//! Behaviour common to every ticket kind

use crate::expiration::SharedExpirationPolicy;
use crate::state::{TicketPhase, TicketState};
use chrono::{DateTime, Utc};
use std::fmt;
use std::hash::{Hash, Hasher};
use tollgate_core::{TicketId, TicketKind};

/// A bearer credential with identity, creation time and an expiration policy
///
/// Identity is the id alone: two tickets are the same ticket iff their ids
/// are equal, whatever their concrete kind. Every implementor's `PartialEq`
/// must agree with [`same_ticket`].
///
/// Recording a use is left to each kind as `update_state_at`: a service
/// ticket is owned and takes `&mut self`, while a ticket-granting ticket is
/// shared behind an `Arc` and records uses through its own lock.
pub trait Ticket: fmt::Debug + Send + Sync {
    /// Unique, immutable identifier
    fn id(&self) -> &TicketId;

    fn kind(&self) -> TicketKind;

    /// Snapshot of the usage state
    fn state(&self) -> TicketState;

    fn expiration_policy(&self) -> &SharedExpirationPolicy;

    /// Whether the ticket is expired at `now`; pure and repeatable
    fn is_expired_at(&self, now: DateTime<Utc>) -> bool;

    /// Id of the ticket-granting ticket this ticket descends from, if any
    fn granting_ticket_id(&self) -> Option<&TicketId>;

    fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    fn creation_time(&self) -> DateTime<Utc> {
        self.state().creation_time()
    }

    fn last_time_used(&self) -> DateTime<Utc> {
        self.state().last_time_used()
    }

    fn count_of_uses(&self) -> u32 {
        self.state().count_of_uses()
    }

    /// Fresh, used or expired at `now`
    fn lifecycle_at(&self, now: DateTime<Utc>) -> TicketPhase {
        if self.is_expired_at(now) {
            TicketPhase::Expired
        } else {
            self.state().phase()
        }
    }
}

/// Id-only identity across ticket kinds
pub fn same_ticket(left: &dyn Ticket, right: &dyn Ticket) -> bool {
    left.id() == right.id()
}

impl PartialEq for dyn Ticket + '_ {
    fn eq(&self, other: &Self) -> bool {
        same_ticket(self, other)
    }
}

impl Eq for dyn Ticket + '_ {}

impl Hash for dyn Ticket + '_ {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

/// Implements id-only `PartialEq`/`Eq`/`Hash` for a ticket type, plus
/// `PartialEq` against each listed ticket type in both directions.
macro_rules! ticket_identity {
    ($ty:ty $(, $other:ty)*) => {
        impl PartialEq for $ty {
            fn eq(&self, other: &Self) -> bool {
                $crate::ticket::Ticket::id(self) == $crate::ticket::Ticket::id(other)
            }
        }

        impl Eq for $ty {}

        impl std::hash::Hash for $ty {
            fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
                std::hash::Hash::hash($crate::ticket::Ticket::id(self), state);
            }
        }

        $(
            impl PartialEq<$other> for $ty {
                fn eq(&self, other: &$other) -> bool {
                    $crate::ticket::Ticket::id(self) == $crate::ticket::Ticket::id(other)
                }
            }

            impl PartialEq<$ty> for $other {
                fn eq(&self, other: &$ty) -> bool {
                    $crate::ticket::Ticket::id(self) == $crate::ticket::Ticket::id(other)
                }
            }
        )*
    };
}

pub(crate) use ticket_identity;
