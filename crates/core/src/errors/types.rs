//! Core error type definitions

use crate::types::{TicketId, TicketKind};
use std::path::PathBuf;

/// Result type alias for tollgate operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for tollgate operations using thiserror
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required constructor argument was absent or malformed
    InvalidArgument { argument: String, message: String },

    /// The operation is not permitted in the ticket's current state
    InvalidState { ticket_id: TicketId, message: String },

    /// No ticket with this id is known to the registry
    TicketNotFound { ticket_id: TicketId, kind: TicketKind },

    /// The ticket, or the ticket that granted it, is no longer usable
    TicketExpired { ticket_id: TicketId },

    /// A service ticket was presented by a service it was not issued for
    ServiceMismatch { ticket_id: TicketId, service: String },

    /// Configuration errors
    Configuration { message: String },

    /// JSON serialization/deserialization errors
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    /// File system operations
    FileSystem {
        path: PathBuf,
        operation: String,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Whether the error reports an unusable ticket rather than a fault
    ///
    /// Relying parties typically answer these with "authentication failed"
    /// and ask the user to log in again.
    #[must_use]
    pub const fn is_ticket_rejection(&self) -> bool {
        matches!(
            self,
            Error::TicketNotFound { .. }
                | Error::TicketExpired { .. }
                | Error::ServiceMismatch { .. }
        )
    }
}
