//! Ticket-granting tickets and the non-owning references to them

use crate::expiration::SharedExpirationPolicy;
use crate::record::TicketGrantingTicketRecord;
use crate::service_ticket::ServiceTicket;
use crate::state::TicketState;
use crate::ticket::{ticket_identity, Ticket};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use parking_lot::Mutex;
use std::fmt;
use std::sync::{Arc, Weak};
use tollgate_core::{Authentication, Error, Result, SharedService, TicketId, TicketKind};
use tracing::{debug, info};

/// Non-owning reference from a granted ticket back to its grantor
///
/// Holding one never keeps the grantor alive. Once the owner (normally the
/// registry) drops the ticket-granting ticket, [`upgrade`](Self::upgrade)
/// returns `None` and the granted ticket is unusable.
#[derive(Clone)]
pub struct GrantingTicketRef {
    id: TicketId,
    handle: Weak<TicketGrantingTicket>,
}

impl GrantingTicketRef {
    pub fn new(ticket: &Arc<TicketGrantingTicket>) -> Self {
        Self {
            id: ticket.id.clone(),
            handle: Arc::downgrade(ticket),
        }
    }

    /// A reference that only remembers the id
    pub fn detached(id: TicketId) -> Self {
        Self {
            id,
            handle: Weak::new(),
        }
    }

    pub(crate) fn from_weak(id: TicketId, handle: Weak<TicketGrantingTicket>) -> Self {
        Self { id, handle }
    }

    pub fn id(&self) -> &TicketId {
        &self.id
    }

    pub fn upgrade(&self) -> Option<Arc<TicketGrantingTicket>> {
        self.handle.upgrade()
    }

    pub fn is_live(&self) -> bool {
        self.handle.strong_count() > 0
    }
}

impl fmt::Debug for GrantingTicketRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GrantingTicketRef")
            .field("id", &self.id)
            .field("live", &self.is_live())
            .finish()
    }
}

#[derive(Debug)]
struct GrantorState {
    state: TicketState,
    expired: bool,
    services: IndexMap<TicketId, SharedService>,
}

/// Root credential of a login session, or a proxy-granting ticket when it
/// has a parent
///
/// Shared behind an `Arc`; the mutable parts (usage state, the destroyed
/// flag and the granted-services map) sit behind an internal lock so that
/// the service tickets' weak back-references can read them.
#[derive(Debug)]
pub struct TicketGrantingTicket {
    id: TicketId,
    authentication: Arc<Authentication>,
    policy: SharedExpirationPolicy,
    parent: Option<GrantingTicketRef>,
    proxied_by: Option<SharedService>,
    inner: Mutex<GrantorState>,
}

ticket_identity!(TicketGrantingTicket);

impl TicketGrantingTicket {
    /// Create a root ticket-granting ticket for a fresh login
    pub fn new(
        id: TicketId,
        authentication: impl Into<Arc<Authentication>>,
        policy: SharedExpirationPolicy,
    ) -> Arc<Self> {
        Self::new_at(id, authentication, policy, Utc::now())
    }

    pub fn new_at(
        id: TicketId,
        authentication: impl Into<Arc<Authentication>>,
        policy: SharedExpirationPolicy,
        now: DateTime<Utc>,
    ) -> Arc<Self> {
        Arc::new(Self::with_lineage(
            id,
            authentication.into(),
            policy,
            None,
            None,
            now,
        ))
    }

    pub(crate) fn new_proxy(
        id: TicketId,
        authentication: Arc<Authentication>,
        policy: SharedExpirationPolicy,
        parent: &Arc<Self>,
        proxied_by: SharedService,
        now: DateTime<Utc>,
    ) -> Arc<Self> {
        info!(
            ticket_id = %id,
            parent_id = %parent.id,
            service = proxied_by.id(),
            "granting proxy-granting ticket"
        );
        Arc::new(Self::with_lineage(
            id,
            authentication,
            policy,
            Some(GrantingTicketRef::new(parent)),
            Some(proxied_by),
            now,
        ))
    }

    fn with_lineage(
        id: TicketId,
        authentication: Arc<Authentication>,
        policy: SharedExpirationPolicy,
        parent: Option<GrantingTicketRef>,
        proxied_by: Option<SharedService>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            authentication,
            policy,
            parent,
            proxied_by,
            inner: Mutex::new(GrantorState {
                state: TicketState::new(now),
                expired: false,
                services: IndexMap::new(),
            }),
        }
    }

    /// Authentication context inherited by every ticket this one grants
    pub fn authentication(&self) -> Arc<Authentication> {
        Arc::clone(&self.authentication)
    }

    /// Issue a service ticket for `service`
    ///
    /// The ticket counts as a new login when credentials were just
    /// presented or when this is the first ticket granted in the session.
    /// Granting is a use of this ticket and is recorded in its usage state.
    pub fn grant_service_ticket(
        self: &Arc<Self>,
        id: TicketId,
        service: SharedService,
        policy: SharedExpirationPolicy,
        credentials_provided: bool,
    ) -> Result<ServiceTicket> {
        self.grant_service_ticket_at(id, service, policy, credentials_provided, Utc::now())
    }

    pub fn grant_service_ticket_at(
        self: &Arc<Self>,
        id: TicketId,
        service: SharedService,
        policy: SharedExpirationPolicy,
        credentials_provided: bool,
        now: DateTime<Utc>,
    ) -> Result<ServiceTicket> {
        if self.is_expired_at(now) {
            return Err(Error::ticket_expired(&self.id));
        }

        let mut inner = self.inner.lock();
        let from_new_login = credentials_provided || inner.state.count_of_uses() == 0;
        let ticket = ServiceTicket::builder()
            .id(id.clone())
            .granting_ticket(self)
            .service(Arc::clone(&service))
            .from_new_login(from_new_login)
            .expiration_policy(policy)
            .created_at(now)
            .build()?;

        inner.state.advance(now);
        inner.services.insert(id, service);

        debug!(
            ticket_id = %ticket.id(),
            granting_ticket_id = %self.id,
            from_new_login,
            "granted service ticket"
        );
        Ok(ticket)
    }

    /// Record one use of this ticket without granting anything
    pub fn update_state(&self) {
        self.update_state_at(Utc::now());
    }

    pub fn update_state_at(&self, now: DateTime<Utc>) {
        self.inner.lock().state.advance(now);
    }

    /// Destroy this ticket; it and its descendants report expired from now on
    pub fn mark_expired(&self) {
        self.inner.lock().expired = true;
        info!(ticket_id = %self.id, "ticket-granting ticket destroyed");
    }

    pub fn is_marked_expired(&self) -> bool {
        self.inner.lock().expired
    }

    /// Services granted a ticket by this one, keyed by service ticket id
    pub fn granted_services(&self) -> Vec<(TicketId, SharedService)> {
        self.inner
            .lock()
            .services
            .iter()
            .map(|(id, service)| (id.clone(), Arc::clone(service)))
            .collect()
    }

    pub fn granted_service_ticket_ids(&self) -> Vec<TicketId> {
        self.inner.lock().services.keys().cloned().collect()
    }

    pub fn count_of_granted_services(&self) -> usize {
        self.inner.lock().services.len()
    }

    /// Forget every granted service, returning the service ticket ids
    pub fn remove_all_services(&self) -> Vec<TicketId> {
        self.inner
            .lock()
            .services
            .drain(..)
            .map(|(id, _)| id)
            .collect()
    }

    pub fn parent(&self) -> Option<Arc<Self>> {
        self.parent.as_ref().and_then(GrantingTicketRef::upgrade)
    }

    pub fn parent_id(&self) -> Option<&TicketId> {
        self.parent.as_ref().map(GrantingTicketRef::id)
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// The service a proxy-granting ticket was delegated to
    pub fn proxied_by(&self) -> Option<&SharedService> {
        self.proxied_by.as_ref()
    }

    /// Topmost live ancestor, or this ticket when it is the root
    pub fn root(self: &Arc<Self>) -> Arc<Self> {
        let mut current = Arc::clone(self);
        while let Some(parent) = current.parent() {
            current = parent;
        }
        current
    }

    /// Authentications along the proxy chain, root first
    pub fn chained_authentications(&self) -> Vec<Arc<Authentication>> {
        let mut chain = vec![self.authentication()];
        let mut next = self.parent();
        while let Some(ticket) = next {
            chain.push(ticket.authentication());
            next = ticket.parent();
        }
        chain.reverse();
        chain
    }

    pub fn to_record(&self) -> TicketGrantingTicketRecord {
        let inner = self.inner.lock();
        TicketGrantingTicketRecord {
            id: self.id.clone(),
            authentication: (*self.authentication).clone(),
            parent_id: self.parent_id().cloned(),
            proxied_by: self
                .proxied_by
                .as_ref()
                .map(|service| service.original_url().to_string()),
            services: inner
                .services
                .iter()
                .map(|(id, service)| (id.clone(), service.original_url().to_string()))
                .collect(),
            state: inner.state,
            expired: inner.expired,
            policy: self.policy.config(),
        }
    }

    /// Rebuild a stored ticket exactly, without any precondition checks
    ///
    /// `parent` is only consulted when the record names a parent; pass
    /// `Weak::new()` when the parent could not be restored and the ticket
    /// will report itself expired.
    pub fn restore<F>(
        record: TicketGrantingTicketRecord,
        parent: Weak<Self>,
        policy: SharedExpirationPolicy,
        resolve_service: F,
    ) -> Arc<Self>
    where
        F: Fn(&str) -> SharedService,
    {
        let services = record
            .services
            .iter()
            .map(|(id, service)| (id.clone(), resolve_service(service.as_str())))
            .collect();
        Arc::new(Self {
            id: record.id,
            authentication: Arc::new(record.authentication),
            policy,
            parent: record
                .parent_id
                .map(|id| GrantingTicketRef::from_weak(id, parent)),
            proxied_by: record.proxied_by.as_deref().map(&resolve_service),
            inner: Mutex::new(GrantorState {
                state: record.state,
                expired: record.expired,
                services,
            }),
        })
    }
}

impl Ticket for TicketGrantingTicket {
    fn id(&self) -> &TicketId {
        &self.id
    }

    fn kind(&self) -> TicketKind {
        if self.parent.is_some() {
            TicketKind::ProxyGrantingTicket
        } else {
            TicketKind::TicketGrantingTicket
        }
    }

    fn state(&self) -> TicketState {
        self.inner.lock().state
    }

    fn expiration_policy(&self) -> &SharedExpirationPolicy {
        &self.policy
    }

    // A proxy-granting ticket dies with its parent.
    fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        let (expired, state) = {
            let inner = self.inner.lock();
            (inner.expired, inner.state)
        };
        if expired || self.policy.is_expired(&state, now) {
            return true;
        }
        match &self.parent {
            None => false,
            Some(parent) => parent
                .upgrade()
                .map_or(true, |parent| parent.is_expired_at(now)),
        }
    }

    fn granting_ticket_id(&self) -> Option<&TicketId> {
        self.parent_id()
    }
}
