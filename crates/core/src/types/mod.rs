//! Core domain types shared by tickets and the registry.
//!
//! ## Organization
//!
//! - **`ids`**: Ticket identifiers and ticket kinds
//! - **`service`**: The `Service` capability a service ticket is bound to
//! - **`authentication`**: The principal and authentication context owned by
//!   a ticket-granting ticket

pub mod authentication;
pub mod ids;
pub mod service;

pub use authentication::*;
pub use ids::*;
pub use service::*;
