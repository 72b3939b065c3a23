//! Cascading destroy and expiry sweeps

use super::TicketRegistry;
use chrono::{DateTime, Utc};
use tollgate_core::TicketId;
use tollgate_ticket::Ticket;
use tracing::{debug, info};

/// Counts of tickets removed by one sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupReport {
    pub ticket_granting_tickets_removed: usize,
    pub service_tickets_removed: usize,
}

impl CleanupReport {
    pub fn total(&self) -> usize {
        self.ticket_granting_tickets_removed + self.service_tickets_removed
    }
}

/// Ids removed by one cascading destroy
#[derive(Debug, Default)]
pub(super) struct DestroyedTickets {
    pub(super) ticket_granting_tickets: Vec<TicketId>,
    pub(super) service_tickets: Vec<TicketId>,
}

impl DestroyedTickets {
    pub(super) fn into_ids(self) -> Vec<TicketId> {
        let mut ids = self.ticket_granting_tickets;
        ids.extend(self.service_tickets);
        ids
    }
}

impl TicketRegistry {
    pub(super) fn destroy_cascade(&self, ticket_id: &TicketId) -> DestroyedTickets {
        let mut destroyed = DestroyedTickets::default();
        let mut pending = vec![ticket_id.clone()];

        while let Some(id) = pending.pop() {
            let Some((_, ticket)) = self.granting_tickets.remove(&id) else {
                continue;
            };
            ticket.mark_expired();

            for service_ticket_id in ticket.granted_service_ticket_ids() {
                if self.service_tickets.remove(&service_ticket_id).is_some() {
                    destroyed.service_tickets.push(service_ticket_id);
                }
            }

            pending.extend(
                self.granting_tickets
                    .iter()
                    .filter(|entry| entry.value().parent_id() == Some(&id))
                    .map(|entry| entry.key().clone()),
            );
            destroyed.ticket_granting_tickets.push(id);
        }

        if !destroyed.ticket_granting_tickets.is_empty() {
            info!(
                ticket_id = %ticket_id,
                ticket_granting_tickets = destroyed.ticket_granting_tickets.len(),
                service_tickets = destroyed.service_tickets.len(),
                "destroyed ticket-granting ticket"
            );
        }
        destroyed
    }

    /// Remove every expired ticket
    pub fn cleanup(&self) -> CleanupReport {
        self.cleanup_at(Utc::now())
    }

    /// Remove tickets expired at `now`
    ///
    /// Expired ticket-granting tickets are destroyed with their descendants.
    /// Service tickets are removed when expired themselves or when their
    /// ticket-granting ticket is expired or gone.
    pub fn cleanup_at(&self, now: DateTime<Utc>) -> CleanupReport {
        let mut report = CleanupReport::default();

        let expired: Vec<TicketId> = self
            .granting_tickets
            .iter()
            .filter(|entry| entry.value().is_expired_at(now))
            .map(|entry| entry.key().clone())
            .collect();
        for id in expired {
            let destroyed = self.destroy_cascade(&id);
            report.ticket_granting_tickets_removed += destroyed.ticket_granting_tickets.len();
            report.service_tickets_removed += destroyed.service_tickets.len();
        }

        let before = self.service_tickets.len();
        self.service_tickets.retain(|_, ticket| {
            !ticket.is_expired_at(now)
                && ticket
                    .granting_ticket()
                    .is_some_and(|granting| !granting.is_expired_at(now))
        });
        report.service_tickets_removed += before.saturating_sub(self.service_tickets.len());

        if report.total() > 0 {
            info!(
                ticket_granting_tickets = report.ticket_granting_tickets_removed,
                service_tickets = report.service_tickets_removed,
                "removed expired tickets"
            );
        } else {
            debug!("no expired tickets");
        }
        report
    }
}
