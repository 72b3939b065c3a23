//! Expiration policy implementations

mod any_of;
mod granting;
mod multi_use;
mod never;
mod throttled;
mod timeout;

pub use any_of::AnyOf;
pub use granting::TicketGrantingTicketPolicy;
pub use multi_use::MultiUseOrTimeout;
pub use never::NeverExpires;
pub use throttled::ThrottledUseAndTimeout;
pub use timeout::{HardTimeout, IdleTimeout};
