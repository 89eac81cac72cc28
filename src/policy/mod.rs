//! Cookie retention policy.
//!
//! Decides which cookies survive a Fire Button wipe:
//! - [`AllowListOracle`]: the external "preserve logins" decision
//! - [`PreserveLogins`]: an in-memory oracle over a set of domains
//! - [`CookiePolicy`]: the oracle plus the fixed settings domain

use crate::cookies::canonicalcookie::CanonicalCookie;
use dashmap::DashSet;

/// Cookie domain that is never deleted by a full wipe.
///
/// The search settings (theme, language, ...) live in cookies on this domain.
/// Dropping them would silently reset user-visible preferences. They are not
/// stored in a personally identifiable way; e.g. the large font size setting
/// is stored as `s=l`.
pub const SETTINGS_COOKIE_DOMAIN: &str = "duckduckgo.com";

/// Decides whether cookies of a domain were chosen by the user to survive.
pub trait AllowListOracle: Send + Sync {
    fn is_allowed(&self, cookie_domain: &str) -> bool;
}

/// Closures work as oracles, which keeps tests and adapters short.
impl<F> AllowListOracle for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn is_allowed(&self, cookie_domain: &str) -> bool {
        self(cookie_domain)
    }
}

/// In-memory "preserve logins" list.
///
/// A cookie domain is allowed when it, or the same domain with its leading
/// dot removed, is in the list. Persisting the list is the host's job.
#[derive(Debug, Default)]
pub struct PreserveLogins {
    domains: DashSet<String>,
}

impl PreserveLogins {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_domains<I, S>(domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let logins = Self::new();
        for domain in domains {
            logins.add_domain(domain);
        }
        logins
    }

    /// Add a domain. Leading dots are dropped so `.example.com` and
    /// `example.com` name the same entry.
    pub fn add_domain(&self, domain: impl Into<String>) {
        let domain = domain.into();
        let normalized = domain.trim_start_matches('.').to_lowercase();
        if !normalized.is_empty() {
            self.domains.insert(normalized);
        }
    }

    pub fn remove_domain(&self, domain: &str) -> bool {
        let normalized = domain.trim_start_matches('.').to_lowercase();
        self.domains.remove(&normalized).is_some()
    }

    pub fn clear_all(&self) {
        self.domains.clear();
    }

    /// Sorted snapshot of the allowed domains.
    pub fn allowed_domains(&self) -> Vec<String> {
        let mut domains: Vec<String> = self.domains.iter().map(|d| d.key().clone()).collect();
        domains.sort();
        domains
    }
}

impl AllowListOracle for PreserveLogins {
    fn is_allowed(&self, cookie_domain: &str) -> bool {
        let normalized = cookie_domain.trim_start_matches('.');
        if normalized.bytes().any(|b| b.is_ascii_uppercase()) {
            return self.domains.contains(&normalized.to_lowercase());
        }
        self.domains.contains(normalized)
    }
}

/// Retention decision used during extraction.
#[derive(Clone, Copy)]
pub struct CookiePolicy<'a> {
    settings_domain: &'a str,
    oracle: &'a dyn AllowListOracle,
}

impl<'a> CookiePolicy<'a> {
    pub fn new(settings_domain: &'a str, oracle: &'a dyn AllowListOracle) -> Self {
        Self {
            settings_domain,
            oracle,
        }
    }

    /// Policy protecting [`SETTINGS_COOKIE_DOMAIN`].
    pub fn with_oracle(oracle: &'a dyn AllowListOracle) -> Self {
        Self::new(SETTINGS_COOKIE_DOMAIN, oracle)
    }

    /// Whether `cookie` must survive a full wipe.
    pub fn is_preserved(&self, cookie: &CanonicalCookie) -> bool {
        cookie.domain == self.settings_domain || self.oracle.is_allowed(&cookie.domain)
    }

    /// Whether `cookie` must survive a clear aimed at `domain` alone:
    /// everything on other domains stays, and so do allow-listed cookies.
    pub fn is_preserved_except(&self, cookie: &CanonicalCookie, domain: &str) -> bool {
        cookie.domain != domain || self.oracle.is_allowed(&cookie.domain)
    }
}
