//! Display implementations for error types

use super::types::Error;
use std::fmt;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidArgument { argument, message } => {
                write!(f, "invalid argument '{argument}': {message}")
            }
            Error::InvalidState { ticket_id, message } => {
                write!(f, "ticket '{ticket_id}' is in an invalid state: {message}")
            }
            Error::TicketNotFound { ticket_id, kind } => {
                write!(f, "{kind} '{ticket_id}' not found")
            }
            Error::TicketExpired { ticket_id } => {
                write!(f, "ticket '{ticket_id}' has expired")
            }
            Error::ServiceMismatch { ticket_id, service } => {
                write!(
                    f,
                    "ticket '{ticket_id}' was not issued for service '{service}'"
                )
            }
            Error::Configuration { message } => {
                write!(f, "configuration error: {message}")
            }
            Error::Json { message, .. } => {
                write!(f, "JSON error: {message}")
            }
            Error::FileSystem {
                path,
                operation,
                source,
            } => {
                write!(
                    f,
                    "file system {} operation failed for '{}': {}",
                    operation,
                    path.display(),
                    source
                )
            }
        }
    }
}
