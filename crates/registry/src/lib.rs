//! Ticket registry for tollgate
//!
//! The registry owns every ticket-granting ticket and service ticket. It is
//! the layer that turns the ticket core's "spent but not refused" semantics
//! into accept/reject decisions:
//!
//! - validation of one service ticket id is serialised, so a single-use
//!   ticket is granted to at most one caller
//! - expired tickets, and tickets whose grantor is expired or gone, are
//!   rejected before they are consumed
//! - destroying a ticket-granting ticket removes the service tickets and
//!   proxy-granting tickets descending from it

pub mod assertion;
pub mod config;
pub mod id_generator;
pub mod registry;

pub use assertion::Assertion;
pub use config::{ConfigSource, IdGeneratorConfig, RegistryConfig, RegistryConfigBuilder};
pub use id_generator::{DefaultTicketIdGenerator, TicketIdGenerator};
pub use registry::{CleanupReport, RegistrySnapshot, TicketRegistry};
