//! Error types and result extensions for tollgate operations

mod builders;
mod conversions;
mod diagnostic;
mod display;
mod extensions;
mod types;

pub use extensions::*;
pub use types::{Error, Result};
