//! Ticket id generation
//!
//! Ids have the form `PREFIX-sequence-random[-suffix]`. The sequence makes
//! ids from one generator unique; the random part makes them unguessable.

use crate::config::IdGeneratorConfig;
use rand::{distributions::Alphanumeric, Rng};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use tollgate_core::{TicketId, TicketKind};

/// Source of fresh ticket ids
pub trait TicketIdGenerator: fmt::Debug + Send + Sync {
    /// Produce an id not previously returned by this generator
    fn new_ticket_id(&self, kind: TicketKind) -> TicketId;
}

/// Counter plus thread-local CSPRNG generator
#[derive(Debug)]
pub struct DefaultTicketIdGenerator {
    sequence: AtomicU64,
    random_length: usize,
    suffix: Option<String>,
}

impl DefaultTicketIdGenerator {
    pub fn new(config: &IdGeneratorConfig) -> Self {
        Self {
            sequence: AtomicU64::new(0),
            random_length: config.random_length,
            suffix: config.suffix.clone(),
        }
    }

    fn random_part(&self) -> String {
        rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(self.random_length)
            .map(char::from)
            .collect()
    }
}

impl Default for DefaultTicketIdGenerator {
    fn default() -> Self {
        Self::new(&IdGeneratorConfig::default())
    }
}

impl TicketIdGenerator for DefaultTicketIdGenerator {
    fn new_ticket_id(&self, kind: TicketKind) -> TicketId {
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        let mut id = format!("{}-{}-{}", kind.prefix(), sequence, self.random_part());
        if let Some(suffix) = &self.suffix {
            id.push('-');
            id.push_str(suffix);
        }
        // Prefix, digits, alphanumerics and a validated suffix: never blank
        TicketId::new_unchecked(id)
    }
}
