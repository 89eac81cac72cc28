use crate::base::cacheerror::CacheError;
use crate::cookies::canonicalcookie::{CanonicalCookie, CookiePriority, SameSite};
use crate::cookies::store::{CookieStore, CookiesFuture, StoreOpFuture};
use dashmap::DashMap;
use std::sync::Arc;
use time::OffsetDateTime;
use url::Url;

/// In-memory live cookie store.
/// Modeled after Chromium's `net::CookieMonster`.
///
/// Cloning yields another handle onto the same jar.
#[derive(Clone)]
pub struct CookieMonster {
    // Store: Map<Domain, List<Cookie>>
    // Using DashMap for high concurrency.
    store: Arc<DashMap<String, Vec<CanonicalCookie>>>,
}

impl Default for CookieMonster {
    fn default() -> Self {
        Self::new()
    }
}

impl CookieMonster {
    pub fn new() -> Self {
        Self {
            store: Arc::new(DashMap::new()),
        }
    }

    pub fn set_canonical_cookie(&self, cookie: CanonicalCookie) {
        let mut entry = self.store.entry(cookie.domain.clone()).or_default();

        // Remove existing if name/domain/path match
        entry.retain(|c| !c.is_same_cookie(&cookie));
        entry.push(cookie);
    }

    /// Remove the cookie with the same name, domain and path.
    /// Returns whether anything was removed.
    pub fn delete_canonical_cookie(&self, cookie: &CanonicalCookie) -> bool {
        let Some(mut entry) = self.store.get_mut(&cookie.domain) else {
            return false;
        };

        let before = entry.len();
        entry.retain(|c| !c.is_same_cookie(cookie));
        let removed = entry.len() != before;
        let now_empty = entry.is_empty();
        drop(entry); // Release shard lock before removing the key

        if now_empty {
            self.store.remove_if(&cookie.domain, |_, v| v.is_empty());
        }
        removed
    }

    /// Parse a `Set-Cookie` line received from `url` and store it.
    ///
    /// An explicit `Domain` attribute is stored with a leading dot so the
    /// cookie keeps its subdomain scope; otherwise the cookie is host-only.
    pub fn parse_and_save_cookie(&self, url: &Url, cookie_line: &str) -> Result<(), CacheError> {
        use cookie::Cookie;

        let parsed =
            Cookie::parse(cookie_line).map_err(|e| CacheError::invalid_cookie(e.to_string()))?;
        let now = OffsetDateTime::now_utc();
        let host = url.host_str().unwrap_or("").to_lowercase();

        let (domain, host_only) = match parsed.domain() {
            Some(d) => (format!(".{}", d.trim_start_matches('.').to_lowercase()), false),
            None => (host, true),
        };
        if domain.is_empty() || domain == "." {
            return Err(CacheError::invalid_cookie("cookie has no domain"));
        }

        let same_site = match parsed.same_site() {
            Some(cookie::SameSite::Lax) => SameSite::Lax,
            Some(cookie::SameSite::Strict) => SameSite::Strict,
            Some(cookie::SameSite::None) => SameSite::NoRestriction,
            None => SameSite::Unspecified,
        };

        self.set_canonical_cookie(CanonicalCookie {
            name: parsed.name().to_string(),
            value: parsed.value().to_string(),
            domain,
            path: parsed.path().unwrap_or("/").to_string(),
            creation_time: now,
            expiration_time: parsed.expires().and_then(|e| e.datetime()),
            last_access_time: now,
            secure: parsed.secure().unwrap_or(false),
            http_only: parsed.http_only().unwrap_or(false),
            host_only,
            same_site,
            priority: CookiePriority::Medium,
        });
        Ok(())
    }

    /// Get total cookie count.
    pub fn total_cookie_count(&self) -> usize {
        self.store.iter().map(|e| e.value().len()).sum()
    }

    /// Clear all cookies.
    pub fn clear(&self) {
        self.store.clear();
    }

    /// Snapshot of every cookie stored under exactly `domain`.
    pub fn cookies_for_domain(&self, domain: &str) -> Vec<CanonicalCookie> {
        self.store
            .get(domain)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    /// Remove every cookie whose domain, with any leading dot dropped,
    /// starts with `prefix`. Returns how many were removed.
    pub fn remove_domains_with_prefix(&self, prefix: &str) -> usize {
        let mut removed = 0;
        self.store.retain(|domain, cookies| {
            if domain.trim_start_matches('.').starts_with(prefix) {
                removed += cookies.len();
                false
            } else {
                true
            }
        });
        removed
    }

    /// Iterate over all cookies.
    pub fn iter_all_cookies(&self) -> impl Iterator<Item = CanonicalCookie> + '_ {
        self.store.iter().flat_map(|entry| entry.value().clone())
    }
}

impl CookieStore for CookieMonster {
    fn get_all_cookies(&self) -> CookiesFuture {
        let jar = self.clone();
        Box::pin(async move {
            let cookies: Vec<CanonicalCookie> = jar.iter_all_cookies().collect();
            tracing::debug!(count = cookies.len(), "enumerated live cookies");
            Ok(cookies)
        })
    }

    fn set_cookie(&self, cookie: CanonicalCookie) -> StoreOpFuture {
        let jar = self.clone();
        Box::pin(async move {
            jar.set_canonical_cookie(cookie);
            Ok(())
        })
    }

    fn delete_cookie(&self, cookie: CanonicalCookie) -> StoreOpFuture {
        let jar = self.clone();
        Box::pin(async move {
            if !jar.delete_canonical_cookie(&cookie) {
                tracing::debug!(cookie = %cookie.key(), "delete of absent cookie ignored");
            }
            Ok(())
        })
    }
}
