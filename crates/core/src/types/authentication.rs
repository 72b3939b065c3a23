//! Authentication context owned by a ticket-granting ticket

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// The authenticated subject
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Principal {
    id: String,
    #[serde(default)]
    attributes: BTreeMap<String, Value>,
}

impl Principal {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            attributes: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn attributes(&self) -> &BTreeMap<String, Value> {
        &self.attributes
    }
}

/// Result of primary credential verification
///
/// Created once per login and shared, read-only, by the ticket-granting
/// ticket and every service ticket it grants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Authentication {
    principal: Principal,
    authenticated_at: DateTime<Utc>,
    #[serde(default)]
    attributes: BTreeMap<String, Value>,
}

impl Authentication {
    /// Authentication of `principal` happening now
    #[must_use]
    pub fn new(principal: Principal) -> Self {
        Self::at(principal, Utc::now())
    }

    /// Authentication of `principal` at a fixed instant
    #[must_use]
    pub fn at(principal: Principal, authenticated_at: DateTime<Utc>) -> Self {
        Self {
            principal,
            authenticated_at,
            attributes: BTreeMap::new(),
        }
    }

    /// Attach authentication metadata (method, handler, ...)
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    #[must_use]
    pub fn authenticated_at(&self) -> DateTime<Utc> {
        self.authenticated_at
    }

    #[must_use]
    pub fn attributes(&self) -> &BTreeMap<String, Value> {
        &self.attributes
    }
}
