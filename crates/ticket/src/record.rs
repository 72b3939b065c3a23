//! Persisted forms of tickets
//!
//! Storage backends own these records; tickets convert to them with
//! `to_record` and are rebuilt from them with the trusted `restore`
//! constructors, which skip every construction precondition.

use crate::expiration::ExpirationPolicyConfig;
use crate::state::TicketState;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tollgate_core::{Authentication, TicketId};

/// Stored service ticket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceTicketRecord {
    pub id: TicketId,
    pub granting_ticket_id: TicketId,
    /// Bound service url as presented; restoring derives the matching
    /// identifier from it again
    pub service: String,
    pub from_new_login: bool,
    pub state: TicketState,
    /// `None` when the policy has no serializable form
    pub policy: Option<ExpirationPolicyConfig>,
    #[serde(default)]
    pub granted_ticket_already: bool,
}

/// Stored ticket-granting or proxy-granting ticket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketGrantingTicketRecord {
    pub id: TicketId,
    pub authentication: Authentication,
    #[serde(default)]
    pub parent_id: Option<TicketId>,
    #[serde(default)]
    pub proxied_by: Option<String>,
    /// Granted service ticket ids mapped to service urls as presented
    #[serde(default)]
    pub services: IndexMap<TicketId, String>,
    pub state: TicketState,
    #[serde(default)]
    pub expired: bool,
    pub policy: Option<ExpirationPolicyConfig>,
}
