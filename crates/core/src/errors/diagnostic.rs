//! miette diagnostics for error types

use super::types::Error;
use std::fmt::Display;

impl miette::Diagnostic for Error {
    fn code<'a>(&'a self) -> Option<Box<dyn Display + 'a>> {
        let code = match self {
            Error::InvalidArgument { .. } => "tollgate::invalid_argument",
            Error::InvalidState { .. } => "tollgate::invalid_state",
            Error::TicketNotFound { .. } => "tollgate::ticket_not_found",
            Error::TicketExpired { .. } => "tollgate::ticket_expired",
            Error::ServiceMismatch { .. } => "tollgate::service_mismatch",
            Error::Configuration { .. } => "tollgate::configuration",
            Error::Json { .. } => "tollgate::json",
            Error::FileSystem { .. } => "tollgate::file_system",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn Display + 'a>> {
        let help = match self {
            Error::TicketNotFound { .. } | Error::TicketExpired { .. } => {
                "obtain a fresh ticket by authenticating again"
            }
            Error::ServiceMismatch { .. } => {
                "a service ticket can only be validated by the service it was issued for"
            }
            Error::Configuration { .. } => "check the registry configuration file",
            _ => return None,
        };
        Some(Box::new(help))
    }
}
