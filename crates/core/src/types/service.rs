//! The service capability a service ticket is bound to

use crate::constants::JSESSIONID_MARKER;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// A registered relying-party endpoint
///
/// Validation asks the *presenting* service whether it matches the service a
/// ticket was issued for, so `candidate.matches(bound)` is the direction
/// implementors should expect.
pub trait Service: fmt::Debug + Send + Sync {
    /// Stable identifier used for matching and persistence
    fn id(&self) -> &str;

    /// The form the service was presented in; stored tickets keep this so a
    /// restored service reads back exactly as it was issued
    fn original_url(&self) -> &str {
        self.id()
    }

    /// Whether this service should be treated as `other`
    fn matches(&self, other: &dyn Service) -> bool {
        self.id() == other.id()
    }
}

/// Shared, immutable handle to a service
pub type SharedService = Arc<dyn Service>;

/// Web application identified by its callback url
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WebApplicationService {
    id: String,
    original_url: String,
}

impl WebApplicationService {
    /// Create a service from a callback url, dropping any servlet session id
    #[must_use]
    pub fn from_url(url: impl Into<String>) -> Self {
        let original_url = url.into();
        Self {
            id: strip_session_id(&original_url),
            original_url,
        }
    }

    /// Create a shared service handle from a callback url
    #[must_use]
    pub fn shared(url: impl Into<String>) -> SharedService {
        Arc::new(Self::from_url(url))
    }
}

impl Service for WebApplicationService {
    fn id(&self) -> &str {
        &self.id
    }

    fn original_url(&self) -> &str {
        &self.original_url
    }
}

impl fmt::Display for WebApplicationService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

// `;jsessionid=...` runs up to the query string, or to the end of the url.
fn strip_session_id(url: &str) -> String {
    let Some(start) = url.find(JSESSIONID_MARKER) else {
        return url.to_string();
    };
    match url[start..].find('?') {
        Some(offset) => format!("{}{}", &url[..start], &url[start + offset..]),
        None => url[..start].to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_stripped_before_query() {
        let service =
            WebApplicationService::from_url("https://app.example.com/cb;jsessionid=ABC123?x=1");
        assert_eq!(service.id(), "https://app.example.com/cb?x=1");
        assert_eq!(
            service.original_url(),
            "https://app.example.com/cb;jsessionid=ABC123?x=1"
        );
    }

    #[test]
    fn test_session_id_stripped_at_end() {
        let service = WebApplicationService::from_url("https://app.example.com/cb;jsessionid=ABC");
        assert_eq!(service.id(), "https://app.example.com/cb");
    }

    #[test]
    fn test_matching_is_by_id() {
        let bound = WebApplicationService::from_url("https://app.example.com/cb");
        let same = WebApplicationService::from_url("https://app.example.com/cb;jsessionid=Z");
        let other = WebApplicationService::from_url("https://other.example.com/cb");

        assert!(same.matches(&bound));
        assert!(!other.matches(&bound));
    }
}
