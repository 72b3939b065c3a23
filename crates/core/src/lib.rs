//! Core domain types, errors, and constants for `tollgate`.
//!
//! Everything the ticket lifecycle treats as an external collaborator lives
//! here so that the ticket and registry crates share one vocabulary.
//!
//! ## Key Components
//!
//! - **`errors`**: The `Error` enum and `Result` alias. Construction
//!   preconditions and registry lookups fail through it; ticket validation
//!   itself never does.
//! - **`types`**: `TicketId`, `TicketKind`, the `Service` capability and the
//!   `Authentication` context handed from a ticket-granting ticket to the
//!   service tickets it issues.
//! - **`constants`**: Id prefixes, default lifetimes and environment
//!   variable names.
//! - **`logging`**: `tracing` subscriber initialisation.

pub mod constants;
pub mod errors;
pub mod logging;
pub mod types;

pub use self::{
    constants::*,
    errors::{Error, Result, ResultExt},
    types::*,
};
