//! The ticket registry
//!
//! Tickets live in two concurrent maps keyed by id. Validation of a service
//! ticket runs under that ticket's map entry guard, so concurrent attempts
//! on the same id are serialised and a single-use ticket validates at most
//! once. The guard is always released before an entry is removed.
//!
//! Lock order is service ticket entry, then ticket-granting ticket entry,
//! then ticket-granting ticket state. Nothing holds a ticket-granting
//! ticket's lock while touching either map.

mod cleanup;
mod persistence;

#[cfg(test)]
mod tests;

pub use cleanup::CleanupReport;
pub use persistence::RegistrySnapshot;

use crate::assertion::Assertion;
use crate::config::RegistryConfig;
use crate::id_generator::{DefaultTicketIdGenerator, TicketIdGenerator};
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::fmt;
use std::sync::Arc;
use tollgate_core::{
    Authentication, Error, Result, Service, SharedService, TicketId, TicketKind,
};
use tollgate_ticket::{
    create_expiration_policy, ServiceTicket, SharedExpirationPolicy, Ticket, TicketGrantingTicket,
};
use tracing::{debug, info, instrument, warn};

/// Thread-safe store of ticket-granting and service tickets
pub struct TicketRegistry {
    config: RegistryConfig,
    id_generator: Arc<dyn TicketIdGenerator>,
    service_ticket_policy: SharedExpirationPolicy,
    ticket_granting_ticket_policy: SharedExpirationPolicy,
    proxy_granting_ticket_policy: SharedExpirationPolicy,
    granting_tickets: DashMap<TicketId, Arc<TicketGrantingTicket>>,
    service_tickets: DashMap<TicketId, ServiceTicket>,
}

impl TicketRegistry {
    /// Create a registry with the default id generator
    pub fn new(config: RegistryConfig) -> Result<Self> {
        let id_generator = Arc::new(DefaultTicketIdGenerator::new(&config.id_generator));
        Self::with_id_generator(config, id_generator)
    }

    pub fn with_id_generator(
        config: RegistryConfig,
        id_generator: Arc<dyn TicketIdGenerator>,
    ) -> Result<Self> {
        config.validate()?;

        let registry = Self {
            service_ticket_policy: create_expiration_policy(&config.service_ticket_policy)?,
            ticket_granting_ticket_policy: create_expiration_policy(
                &config.ticket_granting_ticket_policy,
            )?,
            proxy_granting_ticket_policy: create_expiration_policy(
                &config.proxy_granting_ticket_policy,
            )?,
            id_generator,
            granting_tickets: DashMap::new(),
            service_tickets: DashMap::new(),
            config,
        };

        info!(
            remove_expired_on_validation = registry.config.remove_expired_on_validation,
            "ticket registry initialized"
        );
        Ok(registry)
    }

    /// Create a registry configured from `TOLLGATE_CONFIG`, or with defaults
    pub fn from_environment() -> Result<Self> {
        let (config, source) = RegistryConfig::load()?;
        info!(source = ?source, "loaded registry configuration");
        Self::new(config)
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Open a login session
    pub fn create_ticket_granting_ticket(
        &self,
        authentication: impl Into<Arc<Authentication>>,
    ) -> Result<Arc<TicketGrantingTicket>> {
        self.create_ticket_granting_ticket_at(authentication, Utc::now())
    }

    pub fn create_ticket_granting_ticket_at(
        &self,
        authentication: impl Into<Arc<Authentication>>,
        now: DateTime<Utc>,
    ) -> Result<Arc<TicketGrantingTicket>> {
        let id = self
            .id_generator
            .new_ticket_id(TicketKind::TicketGrantingTicket);
        let ticket = TicketGrantingTicket::new_at(
            id,
            authentication,
            Arc::clone(&self.ticket_granting_ticket_policy),
            now,
        );
        self.add_ticket_granting_ticket(Arc::clone(&ticket))?;
        info!(ticket_id = %ticket.id(), "ticket-granting ticket created");
        Ok(ticket)
    }

    /// Register a ticket-granting ticket built elsewhere
    pub fn add_ticket_granting_ticket(&self, ticket: Arc<TicketGrantingTicket>) -> Result<()> {
        match self.granting_tickets.entry(ticket.id().clone()) {
            Entry::Occupied(occupied) => Err(Error::invalid_state(
                occupied.key(),
                "a ticket with this id is already registered",
            )),
            Entry::Vacant(vacant) => {
                vacant.insert(ticket);
                Ok(())
            }
        }
    }

    /// Issue a service ticket from a live ticket-granting ticket
    pub fn grant_service_ticket(
        &self,
        granting_ticket_id: &TicketId,
        service: SharedService,
        credentials_provided: bool,
    ) -> Result<TicketId> {
        self.grant_service_ticket_at(granting_ticket_id, service, credentials_provided, Utc::now())
    }

    #[instrument(
        level = "debug",
        skip_all,
        fields(granting_ticket_id = %granting_ticket_id, service = service.id())
    )]
    pub fn grant_service_ticket_at(
        &self,
        granting_ticket_id: &TicketId,
        service: SharedService,
        credentials_provided: bool,
        now: DateTime<Utc>,
    ) -> Result<TicketId> {
        let granting = self.ticket_granting_ticket(granting_ticket_id).ok_or_else(|| {
            Error::ticket_not_found(granting_ticket_id, TicketKind::TicketGrantingTicket)
        })?;

        // Reserve the id first so a collision leaves the grantor untouched.
        // Holding the entry also makes a racing destroy wait for the insert,
        // which it then removes.
        let id = self.id_generator.new_ticket_id(TicketKind::ServiceTicket);
        let vacant = match self.service_tickets.entry(id.clone()) {
            Entry::Occupied(_) => {
                return Err(Error::invalid_state(
                    &id,
                    "a ticket with this id is already registered",
                ))
            }
            Entry::Vacant(vacant) => vacant,
        };
        let ticket = granting.grant_service_ticket_at(
            id.clone(),
            service,
            Arc::clone(&self.service_ticket_policy),
            credentials_provided,
            now,
        )?;
        vacant.insert(ticket);
        Ok(id)
    }

    /// Validate a presented service ticket for `service`
    ///
    /// Every attempt on a live ticket consumes a use, including attempts
    /// that fail with [`Error::ServiceMismatch`].
    pub fn validate_service_ticket(
        &self,
        ticket_id: &TicketId,
        service: &dyn Service,
    ) -> Result<Assertion> {
        self.validate_service_ticket_at(ticket_id, service, Utc::now())
    }

    #[instrument(
        level = "debug",
        skip_all,
        fields(ticket_id = %ticket_id, service = service.id())
    )]
    pub fn validate_service_ticket_at(
        &self,
        ticket_id: &TicketId,
        service: &dyn Service,
        now: DateTime<Utc>,
    ) -> Result<Assertion> {
        let mut entry = self
            .service_tickets
            .get_mut(ticket_id)
            .ok_or_else(|| Error::ticket_not_found(ticket_id, TicketKind::ServiceTicket))?;
        let ticket = entry.value_mut();

        if ticket.is_expired_at(now) {
            drop(entry);
            self.service_tickets.remove(ticket_id);
            info!("rejected expired service ticket");
            return Err(Error::ticket_expired(ticket_id));
        }

        let granting = match ticket.granting_ticket() {
            Some(granting) if !granting.is_expired_at(now) => granting,
            _ => {
                drop(entry);
                self.service_tickets.remove(ticket_id);
                info!("rejected service ticket whose ticket-granting ticket is gone");
                return Err(Error::ticket_expired(ticket_id));
            }
        };

        let matched = ticket.is_valid_for_at(service, now);
        let spent = ticket.is_expired_at(now);
        let bound_service = Arc::clone(ticket.service());
        let from_new_login = ticket.is_from_new_login();
        drop(entry);

        if spent && self.config.remove_expired_on_validation {
            self.service_tickets.remove(ticket_id);
            debug!("removed spent service ticket");
        }

        if !matched {
            warn!(
                bound_service = bound_service.id(),
                "service ticket presented by a different service"
            );
            return Err(Error::service_mismatch(ticket_id, service.id()));
        }

        Assertion::new(
            granting.chained_authentications(),
            bound_service,
            from_new_login,
        )
        .ok_or_else(|| Error::invalid_state(ticket_id, "ticket has no authentication chain"))
    }

    /// Delegate a proxy-granting ticket to the service a ticket is bound to
    ///
    /// Delegation does not consume a use of the service ticket; it is
    /// expected to happen before the ticket is validated.
    pub fn delegate_ticket_granting_ticket(
        &self,
        ticket_id: &TicketId,
        authentication: impl Into<Arc<Authentication>>,
    ) -> Result<Arc<TicketGrantingTicket>> {
        self.delegate_ticket_granting_ticket_at(ticket_id, authentication, Utc::now())
    }

    pub fn delegate_ticket_granting_ticket_at(
        &self,
        ticket_id: &TicketId,
        authentication: impl Into<Arc<Authentication>>,
        now: DateTime<Utc>,
    ) -> Result<Arc<TicketGrantingTicket>> {
        let mut entry = self
            .service_tickets
            .get_mut(ticket_id)
            .ok_or_else(|| Error::ticket_not_found(ticket_id, TicketKind::ServiceTicket))?;
        let ticket = entry.value_mut();

        let grantor_live = ticket
            .granting_ticket()
            .is_some_and(|granting| !granting.is_expired_at(now));
        if ticket.is_expired_at(now) || !grantor_live {
            return Err(Error::ticket_expired(ticket_id));
        }

        let id = self
            .id_generator
            .new_ticket_id(TicketKind::ProxyGrantingTicket);
        let vacant = match self.granting_tickets.entry(id.clone()) {
            Entry::Occupied(_) => {
                return Err(Error::invalid_state(
                    &id,
                    "a ticket with this id is already registered",
                ))
            }
            Entry::Vacant(vacant) => vacant,
        };
        let proxy = ticket.grant_ticket_granting_ticket_at(
            id,
            authentication,
            Arc::clone(&self.proxy_granting_ticket_policy),
            now,
        )?;
        vacant.insert(Arc::clone(&proxy));
        drop(entry);

        Ok(proxy)
    }

    /// Destroy a ticket-granting ticket and everything issued from it
    ///
    /// Returns the ids removed from the registry, the ticket-granting ticket
    /// first. Unknown ids remove nothing.
    pub fn destroy_ticket_granting_ticket(&self, ticket_id: &TicketId) -> Vec<TicketId> {
        self.destroy_cascade(ticket_id).into_ids()
    }

    pub fn ticket_granting_ticket(&self, ticket_id: &TicketId) -> Option<Arc<TicketGrantingTicket>> {
        self.granting_tickets
            .get(ticket_id)
            .map(|entry| Arc::clone(entry.value()))
    }

    pub fn contains_service_ticket(&self, ticket_id: &TicketId) -> bool {
        self.service_tickets.contains_key(ticket_id)
    }

    /// Inspect a service ticket without consuming a use
    pub fn with_service_ticket<R>(
        &self,
        ticket_id: &TicketId,
        f: impl FnOnce(&ServiceTicket) -> R,
    ) -> Option<R> {
        self.service_tickets
            .get(ticket_id)
            .map(|entry| f(entry.value()))
    }

    pub fn service_ticket_count(&self) -> usize {
        self.service_tickets.len()
    }

    /// Ticket-granting tickets, proxy-granting tickets included
    pub fn ticket_granting_ticket_count(&self) -> usize {
        self.granting_tickets.len()
    }

    /// Root ticket-granting tickets, one per login session
    pub fn session_count(&self) -> usize {
        self.granting_tickets
            .iter()
            .filter(|entry| entry.value().is_root())
            .count()
    }
}

impl fmt::Debug for TicketRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TicketRegistry")
            .field("config", &self.config)
            .field("id_generator", &self.id_generator)
            .field("ticket_granting_tickets", &self.granting_tickets.len())
            .field("service_tickets", &self.service_tickets.len())
            .finish()
    }
}
