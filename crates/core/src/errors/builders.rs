//! Builder methods for creating errors with context

use super::types::Error;
use crate::types::{TicketId, TicketKind};
use std::path::PathBuf;

impl Error {
    /// Create an invalid argument error
    #[must_use]
    pub fn invalid_argument(argument: impl Into<String>, message: impl Into<String>) -> Self {
        Error::InvalidArgument {
            argument: argument.into(),
            message: message.into(),
        }
    }

    /// Create an invalid state error for a ticket
    #[must_use]
    pub fn invalid_state(ticket_id: &TicketId, message: impl Into<String>) -> Self {
        Error::InvalidState {
            ticket_id: ticket_id.clone(),
            message: message.into(),
        }
    }

    /// Create a ticket not found error
    #[must_use]
    pub fn ticket_not_found(ticket_id: &TicketId, kind: TicketKind) -> Self {
        Error::TicketNotFound {
            ticket_id: ticket_id.clone(),
            kind,
        }
    }

    /// Create a ticket expired error
    #[must_use]
    pub fn ticket_expired(ticket_id: &TicketId) -> Self {
        Error::TicketExpired {
            ticket_id: ticket_id.clone(),
        }
    }

    /// Create a service mismatch error
    #[must_use]
    pub fn service_mismatch(ticket_id: &TicketId, service: impl Into<String>) -> Self {
        Error::ServiceMismatch {
            ticket_id: ticket_id.clone(),
            service: service.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration {
            message: message.into(),
        }
    }

    /// Create a file system error with context
    #[must_use]
    pub fn file_system(
        path: impl Into<PathBuf>,
        operation: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        Error::FileSystem {
            path: path.into(),
            operation: operation.into(),
            source,
        }
    }
}
