//! Ticket identifiers

use crate::constants::{
    PROXY_GRANTING_TICKET_PREFIX, SERVICE_TICKET_PREFIX, TICKET_GRANTING_TICKET_PREFIX,
};
use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::ops::Deref;
use std::str::FromStr;

/// Opaque ticket identifier
///
/// Service tickets and ticket-granting tickets share a single id namespace,
/// so two tickets of different kinds with the same id are the same ticket.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TicketId(String);

impl TicketId {
    /// Create a new TicketId, rejecting empty or whitespace-containing ids
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(Error::invalid_argument("id", "ticket id cannot be empty"));
        }
        if id.chars().any(char::is_whitespace) {
            return Err(Error::invalid_argument(
                "id",
                format!("ticket id '{id}' must not contain whitespace"),
            ));
        }
        Ok(Self(id))
    }

    /// Create a TicketId without validation (use only for generated ids)
    #[must_use]
    pub fn new_unchecked(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the inner string
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The prefix before the first `-`, if any
    #[must_use]
    pub fn prefix(&self) -> Option<&str> {
        self.0.split_once('-').map(|(prefix, _)| prefix)
    }

    /// Convert to String
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Deref for TicketId {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Borrow<str> for TicketId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl FromStr for TicketId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for TicketId {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<&str> for TicketId {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl From<TicketId> for String {
    fn from(id: TicketId) -> Self {
        id.0
    }
}

/// Concrete ticket kinds sharing the id namespace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketKind {
    /// Scoped to one service, issued by a ticket-granting ticket
    ServiceTicket,
    /// Root credential of a login session
    TicketGrantingTicket,
    /// Ticket-granting ticket delegated to a proxying service
    ProxyGrantingTicket,
}

impl TicketKind {
    /// Id prefix used when generating tickets of this kind
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            TicketKind::ServiceTicket => SERVICE_TICKET_PREFIX,
            TicketKind::TicketGrantingTicket => TICKET_GRANTING_TICKET_PREFIX,
            TicketKind::ProxyGrantingTicket => PROXY_GRANTING_TICKET_PREFIX,
        }
    }
}

impl fmt::Display for TicketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TicketKind::ServiceTicket => "service ticket",
            TicketKind::TicketGrantingTicket => "ticket-granting ticket",
            TicketKind::ProxyGrantingTicket => "proxy-granting ticket",
        };
        f.write_str(name)
    }
}
