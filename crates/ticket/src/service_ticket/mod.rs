//! Service tickets: single-service capabilities issued by a ticket-granting
//! ticket
//!
//! A service ticket is validated by the service presenting it. Validation
//! always spends a use first and only then compares services, so a failed
//! match cannot be replayed against a single-use ticket. Whether the ticket
//! may be presented again is decided by its expiration policy, not by
//! [`ServiceTicket::is_valid_for`].
//!
//! ## Concurrency
//!
//! Validation takes `&mut self`. Two validators racing on the same ticket
//! must be serialised by whoever owns it (the registry holds the map entry
//! for the ticket id across the whole check-and-consume sequence);
//! otherwise both could observe a fresh single-use ticket.

mod builder;

pub use builder::ServiceTicketBuilder;

use crate::expiration::SharedExpirationPolicy;
use crate::granting::{GrantingTicketRef, TicketGrantingTicket};
use crate::record::ServiceTicketRecord;
use crate::state::TicketState;
use crate::ticket::{ticket_identity, Ticket};
use chrono::{DateTime, Utc};
use std::sync::{Arc, Weak};
use tollgate_core::{Authentication, Error, Result, Service, SharedService, TicketId, TicketKind};
use tracing::trace;

/// A ticket granting access to exactly one service
#[derive(Debug)]
pub struct ServiceTicket {
    id: TicketId,
    state: TicketState,
    policy: SharedExpirationPolicy,
    granting_ticket: GrantingTicketRef,
    service: SharedService,
    from_new_login: bool,
    granted_ticket_already: bool,
}

ticket_identity!(ServiceTicket, TicketGrantingTicket);

/// Construct a service ticket, failing with `InvalidArgument` when the
/// granting ticket or the service is absent
pub fn new_service_ticket(
    id: TicketId,
    granting_ticket: Option<&Arc<TicketGrantingTicket>>,
    service: Option<SharedService>,
    from_new_login: bool,
    policy: SharedExpirationPolicy,
) -> Result<ServiceTicket> {
    let mut builder = ServiceTicket::builder()
        .id(id)
        .from_new_login(from_new_login)
        .expiration_policy(policy);
    if let Some(granting_ticket) = granting_ticket {
        builder = builder.granting_ticket(granting_ticket);
    }
    if let Some(service) = service {
        builder = builder.service(service);
    }
    builder.build()
}

impl ServiceTicket {
    pub fn builder() -> ServiceTicketBuilder {
        ServiceTicketBuilder::new()
    }

    /// Consume one use, then report whether `candidate` is the bound service
    ///
    /// The use is spent even when the services do not match.
    pub fn is_valid_for(&mut self, candidate: &dyn Service) -> bool {
        self.is_valid_for_at(candidate, Utc::now())
    }

    pub fn is_valid_for_at(&mut self, candidate: &dyn Service, now: DateTime<Utc>) -> bool {
        self.update_state_at(now);
        let matched = candidate.matches(self.service.as_ref());
        trace!(
            ticket_id = %self.id,
            candidate = candidate.id(),
            uses = self.state.count_of_uses(),
            matched,
            "validated service ticket"
        );
        matched
    }

    /// Record one use of this ticket
    pub fn update_state(&mut self) {
        self.update_state_at(Utc::now());
    }

    pub fn update_state_at(&mut self, now: DateTime<Utc>) {
        self.state.advance(now);
    }

    pub fn service(&self) -> &SharedService {
        &self.service
    }

    /// Whether this ticket was issued as a direct result of a credential check
    pub fn is_from_new_login(&self) -> bool {
        self.from_new_login
    }

    /// The issuing ticket-granting ticket, if it is still alive
    pub fn granting_ticket(&self) -> Option<Arc<TicketGrantingTicket>> {
        self.granting_ticket.upgrade()
    }

    pub fn granting_ticket_ref(&self) -> &GrantingTicketRef {
        &self.granting_ticket
    }

    /// Authentication of the issuing ticket-granting ticket
    pub fn authentication(&self) -> Option<Arc<Authentication>> {
        self.granting_ticket().map(|ticket| ticket.authentication())
    }

    /// Delegate a proxy-granting ticket to this ticket's service
    ///
    /// At most one ticket-granting ticket can come from a service ticket.
    pub fn grant_ticket_granting_ticket(
        &mut self,
        id: TicketId,
        authentication: impl Into<Arc<Authentication>>,
        policy: SharedExpirationPolicy,
    ) -> Result<Arc<TicketGrantingTicket>> {
        self.grant_ticket_granting_ticket_at(id, authentication, policy, Utc::now())
    }

    pub fn grant_ticket_granting_ticket_at(
        &mut self,
        id: TicketId,
        authentication: impl Into<Arc<Authentication>>,
        policy: SharedExpirationPolicy,
        now: DateTime<Utc>,
    ) -> Result<Arc<TicketGrantingTicket>> {
        if self.granted_ticket_already {
            return Err(Error::invalid_state(
                &self.id,
                "a ticket-granting ticket has already been granted from this service ticket",
            ));
        }
        let parent = self.granting_ticket().ok_or_else(|| {
            Error::invalid_argument(
                "granting_ticket",
                format!(
                    "ticket-granting ticket '{}' is no longer available",
                    self.granting_ticket.id()
                ),
            )
        })?;

        self.granted_ticket_already = true;
        Ok(TicketGrantingTicket::new_proxy(
            id,
            authentication.into(),
            policy,
            &parent,
            Arc::clone(&self.service),
            now,
        ))
    }

    pub fn has_granted_ticket(&self) -> bool {
        self.granted_ticket_already
    }

    pub fn to_record(&self) -> ServiceTicketRecord {
        ServiceTicketRecord {
            id: self.id.clone(),
            granting_ticket_id: self.granting_ticket.id().clone(),
            service: self.service.original_url().to_string(),
            from_new_login: self.from_new_login,
            state: self.state,
            policy: self.policy.config(),
            granted_ticket_already: self.granted_ticket_already,
        }
    }

    /// Rebuild a stored ticket exactly, without any precondition checks
    ///
    /// Pass `Weak::new()` for `granting_ticket` when the grantor was not
    /// restored; the ticket keeps the stored grantor id but cannot resolve
    /// it.
    pub fn restore(
        record: ServiceTicketRecord,
        granting_ticket: Weak<TicketGrantingTicket>,
        service: SharedService,
        policy: SharedExpirationPolicy,
    ) -> Self {
        Self {
            id: record.id,
            state: record.state,
            policy,
            granting_ticket: GrantingTicketRef::from_weak(record.granting_ticket_id, granting_ticket),
            service,
            from_new_login: record.from_new_login,
            granted_ticket_already: record.granted_ticket_already,
        }
    }
}

impl Ticket for ServiceTicket {
    fn id(&self) -> &TicketId {
        &self.id
    }

    fn kind(&self) -> TicketKind {
        TicketKind::ServiceTicket
    }

    fn state(&self) -> TicketState {
        self.state
    }

    fn expiration_policy(&self) -> &SharedExpirationPolicy {
        &self.policy
    }

    // Grantor liveness is the registry's check, not the policy's.
    fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.policy.is_expired(&self.state, now)
    }

    fn granting_ticket_id(&self) -> Option<&TicketId> {
        Some(self.granting_ticket.id())
    }
}
