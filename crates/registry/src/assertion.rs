//! Outcome of a successful service ticket validation

use std::sync::Arc;
use tollgate_core::{Authentication, Principal, SharedService};

/// What a relying party learns from a validated service ticket
///
/// For tickets issued through a proxy chain the chain is listed root
/// first; the primary authentication is always the original login.
#[derive(Debug, Clone)]
pub struct Assertion {
    primary: Arc<Authentication>,
    chain: Vec<Arc<Authentication>>,
    service: SharedService,
    from_new_login: bool,
}

impl Assertion {
    pub fn new(
        chain: Vec<Arc<Authentication>>,
        service: SharedService,
        from_new_login: bool,
    ) -> Option<Self> {
        let primary = Arc::clone(chain.first()?);
        Some(Self {
            primary,
            chain,
            service,
            from_new_login,
        })
    }

    pub fn primary_authentication(&self) -> &Authentication {
        &self.primary
    }

    pub fn principal(&self) -> &Principal {
        self.primary.principal()
    }

    /// Every authentication along the proxy chain, root first
    pub fn chained_authentications(&self) -> &[Arc<Authentication>] {
        &self.chain
    }

    /// Whether the ticket was issued through proxy delegation
    pub fn is_proxied(&self) -> bool {
        self.chain.len() > 1
    }

    pub fn service(&self) -> &SharedService {
        &self.service
    }

    pub fn is_from_new_login(&self) -> bool {
        self.from_new_login
    }
}
