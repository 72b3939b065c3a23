//! Export and restore of registry contents

use super::TicketRegistry;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::{Arc, Weak};
use tollgate_core::{Error, Result, TicketId, WebApplicationService};
use tollgate_ticket::{
    ExpirationPolicyConfig, ServiceTicket, ServiceTicketRecord, SharedExpirationPolicy, Ticket,
    TicketGrantingTicket, TicketGrantingTicketRecord,
};
use tracing::{info, warn};

/// Everything a registry holds, in storable form
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    #[serde(default)]
    pub ticket_granting_tickets: Vec<TicketGrantingTicketRecord>,
    #[serde(default)]
    pub service_tickets: Vec<ServiceTicketRecord>,
}

impl RegistrySnapshot {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl TicketRegistry {
    pub fn export_ticket_granting_tickets(&self) -> Vec<TicketGrantingTicketRecord> {
        self.granting_tickets
            .iter()
            .map(|entry| entry.value().to_record())
            .collect()
    }

    pub fn export_service_tickets(&self) -> Vec<ServiceTicketRecord> {
        self.service_tickets
            .iter()
            .map(|entry| entry.value().to_record())
            .collect()
    }

    pub fn snapshot(&self) -> RegistrySnapshot {
        RegistrySnapshot {
            ticket_granting_tickets: self.export_ticket_granting_tickets(),
            service_tickets: self.export_service_tickets(),
        }
    }

    /// Rebuild stored tickets exactly as recorded
    ///
    /// Records are trusted: no construction precondition is rechecked and
    /// expired tickets are restored as they are, to be rejected on use or
    /// swept by cleanup. Parents are restored before their children. A
    /// ticket whose grantor is not among the records or already registered
    /// is restored detached and reports itself expired.
    ///
    /// Fails without restoring anything if a record id is already registered
    /// or appears twice among the records. A stored policy that fails
    /// validation is replaced by the registry default for the ticket's kind.
    pub fn restore(
        &self,
        ticket_granting_tickets: Vec<TicketGrantingTicketRecord>,
        service_tickets: Vec<ServiceTicketRecord>,
    ) -> Result<()> {
        self.check_restorable(&ticket_granting_tickets, &service_tickets)?;

        let granting_count = ticket_granting_tickets.len();
        let service_count = service_tickets.len();

        let mut pending = ticket_granting_tickets;
        loop {
            let waiting_before = pending.len();
            let (ready, waiting): (Vec<_>, Vec<_>) = pending.into_iter().partition(|record| {
                record
                    .parent_id
                    .as_ref()
                    .map_or(true, |parent| self.granting_tickets.contains_key(parent))
            });
            pending = waiting;
            for record in ready {
                let parent = self.parent_handle(record.parent_id.as_ref());
                self.restore_granting_ticket(record, parent);
            }
            if pending.is_empty() || pending.len() == waiting_before {
                break;
            }
        }
        for record in pending {
            warn!(
                ticket_id = %record.id,
                parent_id = ?record.parent_id,
                "restoring proxy-granting ticket without its parent"
            );
            self.restore_granting_ticket(record, Weak::new());
        }

        for record in service_tickets {
            let granting = self.parent_handle(Some(&record.granting_ticket_id));
            let service = WebApplicationService::shared(record.service.as_str());
            let policy = restored_policy(&record.id, record.policy.as_ref(), &self.service_ticket_policy);
            let ticket = ServiceTicket::restore(record, granting, service, policy);
            self.service_tickets.insert(ticket.id().clone(), ticket);
        }

        info!(
            ticket_granting_tickets = granting_count,
            service_tickets = service_count,
            "restored tickets"
        );
        Ok(())
    }

    pub fn restore_snapshot(&self, snapshot: RegistrySnapshot) -> Result<()> {
        self.restore(snapshot.ticket_granting_tickets, snapshot.service_tickets)
    }

    fn check_restorable(
        &self,
        ticket_granting_tickets: &[TicketGrantingTicketRecord],
        service_tickets: &[ServiceTicketRecord],
    ) -> Result<()> {
        let ids = ticket_granting_tickets
            .iter()
            .map(|record| &record.id)
            .chain(service_tickets.iter().map(|record| &record.id));
        let mut seen = HashSet::new();
        for id in ids {
            if !seen.insert(id) {
                return Err(Error::invalid_state(
                    id,
                    "ticket id appears more than once in the restored records",
                ));
            }
            if self.granting_tickets.contains_key(id) || self.service_tickets.contains_key(id) {
                return Err(Error::invalid_state(
                    id,
                    "cannot restore over a registered ticket",
                ));
            }
        }
        Ok(())
    }

    fn parent_handle(&self, id: Option<&TicketId>) -> Weak<TicketGrantingTicket> {
        id.and_then(|id| self.granting_tickets.get(id))
            .map(|entry| Arc::downgrade(entry.value()))
            .unwrap_or_default()
    }

    fn restore_granting_ticket(
        &self,
        record: TicketGrantingTicketRecord,
        parent: Weak<TicketGrantingTicket>,
    ) {
        let fallback = if record.parent_id.is_some() {
            &self.proxy_granting_ticket_policy
        } else {
            &self.ticket_granting_ticket_policy
        };
        let policy = restored_policy(&record.id, record.policy.as_ref(), fallback);
        let ticket = TicketGrantingTicket::restore(record, parent, policy, |service| {
            WebApplicationService::shared(service)
        });
        self.granting_tickets.insert(ticket.id().clone(), ticket);
    }
}

fn restored_policy(
    ticket_id: &TicketId,
    config: Option<&ExpirationPolicyConfig>,
    fallback: &SharedExpirationPolicy,
) -> SharedExpirationPolicy {
    match config.map(|config| config.validate().map(|()| config.build())) {
        Some(Ok(policy)) => policy,
        Some(Err(err)) => {
            warn!(
                ticket_id = %ticket_id,
                error = %err,
                "stored expiration policy rejected, using the registry default"
            );
            Arc::clone(fallback)
        }
        None => Arc::clone(fallback),
    }
}
