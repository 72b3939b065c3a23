//! Builder enforcing service ticket construction preconditions

use super::ServiceTicket;
use crate::expiration::SharedExpirationPolicy;
use crate::granting::{GrantingTicketRef, TicketGrantingTicket};
use crate::state::TicketState;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tollgate_core::{Error, Result, SharedService, TicketId};

/// Builder for [`ServiceTicket`]
///
/// `build` fails with `InvalidArgument` when the id, granting ticket,
/// service or expiration policy was never supplied.
#[derive(Debug, Default)]
pub struct ServiceTicketBuilder {
    id: Option<TicketId>,
    granting_ticket: Option<GrantingTicketRef>,
    service: Option<SharedService>,
    from_new_login: bool,
    policy: Option<SharedExpirationPolicy>,
    created_at: Option<DateTime<Utc>>,
}

impl ServiceTicketBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: TicketId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn granting_ticket(mut self, ticket: &Arc<TicketGrantingTicket>) -> Self {
        self.granting_ticket = Some(GrantingTicketRef::new(ticket));
        self
    }

    pub fn service(mut self, service: SharedService) -> Self {
        self.service = Some(service);
        self
    }

    pub fn from_new_login(mut self, from_new_login: bool) -> Self {
        self.from_new_login = from_new_login;
        self
    }

    pub fn expiration_policy(mut self, policy: SharedExpirationPolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Creation time; defaults to now
    pub fn created_at(mut self, now: DateTime<Utc>) -> Self {
        self.created_at = Some(now);
        self
    }

    pub fn build(self) -> Result<ServiceTicket> {
        let id = self
            .id
            .ok_or_else(|| Error::invalid_argument("id", "id cannot be null"))?;
        let granting_ticket = self
            .granting_ticket
            .ok_or_else(|| Error::invalid_argument("granting_ticket", "ticket cannot be null"))?;
        let service = self
            .service
            .ok_or_else(|| Error::invalid_argument("service", "service cannot be null"))?;
        let policy = self.policy.ok_or_else(|| {
            Error::invalid_argument("expiration_policy", "expiration policy cannot be null")
        })?;

        Ok(ServiceTicket {
            id,
            state: TicketState::new(self.created_at.unwrap_or_else(Utc::now)),
            policy,
            granting_ticket,
            service,
            from_new_login: self.from_new_login,
            granted_ticket_already: false,
        })
    }
}
