use serde::{Deserialize, Serialize};
use std::fmt;
use time::OffsetDateTime;

/// Represents a cookie.
/// Modeled after Chromium's `net::CanonicalCookie`.
///
/// `domain` keeps the RFC 6265 convention: a leading `.` marks a cookie
/// that is valid for every subdomain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalCookie {
    pub name: String,
    pub value: String,
    pub domain: String,
    pub path: String,
    pub creation_time: OffsetDateTime,
    pub expiration_time: Option<OffsetDateTime>,
    pub last_access_time: OffsetDateTime,
    pub secure: bool,
    pub http_only: bool,
    pub host_only: bool,
    pub same_site: SameSite,
    pub priority: CookiePriority,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SameSite {
    Unspecified,
    NoRestriction,
    Lax,
    Strict,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CookiePriority {
    Low,
    Medium,
    High,
}

/// Staging identity of a cookie: `(domain, name)`.
///
/// Two cookies with the same key overwrite each other in the staging area,
/// last write wins.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CookieKey {
    pub domain: String,
    pub name: String,
}

impl fmt::Display for CookieKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.domain)
    }
}

impl CanonicalCookie {
    pub fn new(
        name: String,
        value: String,
        domain: String,
        path: String,
        creation_time: OffsetDateTime,
        expiration_time: Option<OffsetDateTime>,
    ) -> Self {
        // A leading dot is the only way a bare constructor learns about scope.
        let host_only = !domain.starts_with('.');
        Self {
            name,
            value,
            domain,
            path,
            creation_time,
            expiration_time,
            last_access_time: creation_time,
            secure: false,
            http_only: false,
            host_only,
            same_site: SameSite::Unspecified,
            priority: CookiePriority::Medium,
        }
    }

    /// Shorthand for a session cookie on path `/` created now.
    pub fn session(name: &str, value: &str, domain: &str) -> Self {
        Self::new(
            name.to_string(),
            value.to_string(),
            domain.to_string(),
            "/".to_string(),
            OffsetDateTime::now_utc(),
            None,
        )
    }

    pub fn key(&self) -> CookieKey {
        CookieKey {
            domain: self.domain.clone(),
            name: self.name.clone(),
        }
    }

    /// Live-store identity: name, domain and path.
    pub fn is_same_cookie(&self, other: &CanonicalCookie) -> bool {
        self.name == other.name && self.domain == other.domain && self.path == other.path
    }

    pub fn is_expired(&self, current_time: OffsetDateTime) -> bool {
        match self.expiration_time {
            Some(expiry) => expiry < current_time,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dot_prefixed_domain_is_not_host_only() {
        let c = CanonicalCookie::session("sid", "1", ".example.com");
        assert!(!c.host_only);

        let c = CanonicalCookie::session("sid", "1", "example.com");
        assert!(c.host_only);
    }

    #[test]
    fn test_key_ignores_path_and_value() {
        let mut a = CanonicalCookie::session("sid", "1", "example.com");
        let mut b = CanonicalCookie::session("sid", "2", "example.com");
        a.path = "/a".to_string();
        b.path = "/b".to_string();

        assert_eq!(a.key(), b.key());
        assert!(!a.is_same_cookie(&b));
        assert_eq!(a.key().to_string(), "sid@example.com");
    }

    #[test]
    fn test_is_expired() {
        let now = OffsetDateTime::now_utc();
        let mut c = CanonicalCookie::session("sid", "1", "example.com");
        assert!(!c.is_expired(now));

        c.expiration_time = Some(now - time::Duration::hours(1));
        assert!(c.is_expired(now));
    }
}
