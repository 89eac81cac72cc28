//! Fire Button data clearing with selective cookie retention.
//!
//! # Flow
//!
//! | Operation | Steps |
//! |-----------|-------|
//! | [`clear`](WebCacheManager::clear) | stage allow-listed cookies, then wipe every data type |
//! | [`consume_cookies`](WebCacheManager::consume_cookies) | replay staged cookies into the live store, then empty staging |
//! | [`remove_cookies_for_domains`](WebCacheManager::remove_cookies_for_domains) | delete matching cookies, waiting at most the configured timeout |
//! | [`clear_domain`](WebCacheManager::clear_domain) | remove one site's records of a [`RecordType`] |
//!
//! Extraction always finishes, staging writes included, before the wipe is
//! issued. That ordering is what keeps preserved cookies alive.
//!
//! Every operation reports completion only. Store and staging failures are
//! logged and the affected step is skipped.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use webcache::cookies::datastore::MemoryDataStore;
//! use webcache::cookies::staging::MemoryStagingStore;
//! use webcache::manager::WebCacheManager;
//! use webcache::policy::PreserveLogins;
//!
//! let manager = WebCacheManager::new();
//! let data_store = MemoryDataStore::new();
//! let staging = Arc::new(MemoryStagingStore::new());
//! let logins = PreserveLogins::from_domains(["example.com"]);
//!
//! manager.clear(&data_store, staging.clone(), &logins).await;
//! // ... next launch ...
//! manager.consume_cookies(staging, data_store.cookie_store()).await;
//! ```

mod config;
pub(crate) mod join;

pub use config::WebCacheConfig;

use crate::base::clearstate::ClearState;
use crate::cookies::canonicalcookie::CanonicalCookie;
use crate::cookies::domain;
use crate::cookies::staging::StagingStore;
use crate::cookies::store::{CookieStore, DataStore, RecordType, StoreOpFuture};
use crate::policy::{AllowListOracle, CookiePolicy};
use std::sync::Arc;
use tokio::sync::watch;

/// Resets the manager to [`ClearState::Idle`] when an operation ends,
/// including when its future is dropped mid-flight.
struct StateGuard<'a> {
    state: &'a watch::Sender<ClearState>,
}

impl StateGuard<'_> {
    fn advance(&self, next: ClearState) {
        tracing::debug!(state = next.as_str(), "clear state changed");
        self.state.send_replace(next);
    }
}

impl Drop for StateGuard<'_> {
    fn drop(&mut self) {
        self.state.send_replace(ClearState::Idle);
    }
}

pub struct WebCacheManager {
    config: WebCacheConfig,
    state: watch::Sender<ClearState>,
}

impl Default for WebCacheManager {
    fn default() -> Self {
        Self::new()
    }
}

impl WebCacheManager {
    pub fn new() -> Self {
        Self::with_config(WebCacheConfig::default())
    }

    pub fn with_config(config: WebCacheConfig) -> Self {
        let (state, _) = watch::channel(ClearState::Idle);
        Self { config, state }
    }

    pub fn config(&self) -> &WebCacheConfig {
        &self.config
    }

    /// Current phase.
    pub fn state(&self) -> ClearState {
        *self.state.borrow()
    }

    /// Observe phase changes.
    pub fn subscribe(&self) -> watch::Receiver<ClearState> {
        self.state.subscribe()
    }

    fn enter(&self, first: ClearState) -> StateGuard<'_> {
        let guard = StateGuard { state: &self.state };
        guard.advance(first);
        guard
    }

    /// Fire Button: keep allow-listed cookies, wipe everything else.
    ///
    /// Cookies on the configured settings domain or allowed by `logins` are
    /// copied into `staging`; afterwards every website data type is removed
    /// from `data_store`. Callers must not overlap `clear` and
    /// [`consume_cookies`](Self::consume_cookies) on the same staging store.
    pub async fn clear(
        &self,
        data_store: &dyn DataStore,
        staging: Arc<dyn StagingStore>,
        logins: &dyn AllowListOracle,
    ) {
        let state = self.enter(ClearState::Extracting);
        self.extract_allowed_cookies(data_store.cookie_store(), staging, logins)
            .await;

        state.advance(ClearState::Wiping);
        self.clear_all_data(data_store).await;
        tracing::debug!("fire button clear complete");
    }

    /// Stage every cookie that survives a full clear.
    ///
    /// No-op when the environment has no cookie store.
    pub async fn extract_allowed_cookies(
        &self,
        cookie_store: Option<Arc<dyn CookieStore>>,
        staging: Arc<dyn StagingStore>,
        logins: &dyn AllowListOracle,
    ) {
        let policy = CookiePolicy::new(&self.config.settings_domain, logins);
        self.stage_cookies(cookie_store, staging, |c| policy.is_preserved(c))
            .await;
    }

    /// Stage every cookie except those set exactly on `domain`, keeping
    /// allow-listed ones even there.
    ///
    /// Used ahead of clearing a single site when everything else must be
    /// replayed afterwards.
    pub async fn extract_excluding_domain(
        &self,
        domain: &str,
        cookie_store: Option<Arc<dyn CookieStore>>,
        staging: Arc<dyn StagingStore>,
        logins: &dyn AllowListOracle,
    ) {
        let policy = CookiePolicy::new(&self.config.settings_domain, logins);
        self.stage_cookies(cookie_store, staging, |c| {
            policy.is_preserved_except(c, domain)
        })
        .await;
    }

    async fn stage_cookies<F>(
        &self,
        cookie_store: Option<Arc<dyn CookieStore>>,
        staging: Arc<dyn StagingStore>,
        keep: F,
    ) where
        F: Fn(&CanonicalCookie) -> bool,
    {
        let Some(cookie_store) = cookie_store else {
            tracing::debug!("no cookie store available, nothing to extract");
            return;
        };

        let cookies = match cookie_store.get_all_cookies().await {
            Ok(cookies) => cookies,
            Err(e) => {
                tracing::warn!(error = %e, "could not enumerate cookies, nothing extracted");
                return;
            }
        };

        let total = cookies.len();
        let kept: Vec<CanonicalCookie> = cookies.into_iter().filter(|c| keep(c)).collect();
        let staged = kept.len();
        if kept.is_empty() {
            tracing::debug!(total, staged, "extracted cookies into staging");
            return;
        }

        let write = tokio::task::spawn_blocking(move || staging.set_cookies(kept));
        match write.await {
            Ok(Ok(())) => tracing::debug!(total, staged, "extracted cookies into staging"),
            Ok(Err(e)) => tracing::warn!(total, staged, error = %e, "failed to stage cookies"),
            Err(e) => tracing::error!(error = %e, "staging write task failed"),
        }
    }

    /// Remove every website data type from `data_store`, regardless of age.
    pub async fn clear_all_data(&self, data_store: &dyn DataStore) {
        if let Err(e) = data_store.remove_all_data().await {
            tracing::warn!(error = %e, "removing all website data failed");
        }
    }

    /// Remove one site's data of `record_type`.
    ///
    /// A leading `www.` is dropped first (configurable), since records are
    /// usually filed under the bare domain. The data store then removes every
    /// record whose display name starts with the result.
    pub async fn clear_domain(
        &self,
        domain: &str,
        record_type: RecordType,
        data_store: &dyn DataStore,
    ) {
        let _state = self.enter(ClearState::WipingDomain);
        let target = if self.config.strip_www_prefix {
            domain::strip_www(domain)
        } else {
            domain
        };

        if let Err(e) = data_store
            .remove_all_data_for_domain(target, record_type)
            .await
        {
            tracing::warn!(domain = %target, record_type = ?record_type, error = %e, "domain data removal failed");
        }
    }

    /// Replay staged cookies into the live store, then empty staging.
    ///
    /// Meant to run at startup before any browsing happens. All inserts are
    /// issued at once and awaited without a deadline: a stuck store blocks
    /// here rather than losing cookies. A cookie whose insert fails is put
    /// back into staging for the next attempt.
    ///
    /// When `cookie_store` is `None` or staging is empty nothing is touched.
    pub async fn consume_cookies(
        &self,
        staging: Arc<dyn StagingStore>,
        cookie_store: Option<Arc<dyn CookieStore>>,
    ) {
        let Some(cookie_store) = cookie_store else {
            tracing::debug!("no cookie store available, staged cookies left in place");
            return;
        };

        let cookies = staging.cookies();
        if cookies.is_empty() {
            return;
        }

        let _state = self.enter(ClearState::Restoring);
        let inserts: Vec<StoreOpFuture> = cookies
            .iter()
            .cloned()
            .map(|cookie| cookie_store.set_cookie(cookie))
            .collect();
        let results = join::join_unbounded("set_cookie", inserts).await;

        let failed: Vec<CanonicalCookie> = cookies
            .into_iter()
            .zip(&results)
            .filter(|(_, result)| result.is_err())
            .map(|(cookie, _)| cookie)
            .collect();
        let restored = results.len() - failed.len();

        // Staging may be file-backed; keep its I/O off the async workers.
        // A failed clear leaves every staged cookie in place, failed ones included.
        let drain = tokio::task::spawn_blocking(move || {
            staging.clear()?;
            staging.set_cookies(failed)
        });

        match drain.await {
            Ok(Ok(())) => tracing::debug!(restored, "restored staged cookies"),
            Ok(Err(e)) => tracing::warn!(restored, error = %e, "restored cookies but staging cleanup failed"),
            Err(e) => tracing::error!(error = %e, "staging cleanup task failed"),
        }
    }

    /// Delete every live cookie matching one of `domains`.
    ///
    /// Each cookie is checked against `domains` in order and deleted at most
    /// once, on its first match. Deletes are awaited for at most the
    /// configured timeout (5 s by default); past that the call returns and
    /// the outstanding deletes finish on their own.
    pub async fn remove_cookies_for_domains(&self, domains: &[String], data_store: &dyn DataStore) {
        let Some(cookie_store) = data_store.cookie_store() else {
            tracing::debug!("no cookie store available, nothing to remove");
            return;
        };

        let _state = self.enter(ClearState::RemovingCookies);
        let cookies = match cookie_store.get_all_cookies().await {
            Ok(cookies) => cookies,
            Err(e) => {
                tracing::warn!(error = %e, "could not enumerate cookies, nothing removed");
                return;
            }
        };

        let deletes: Vec<StoreOpFuture> = cookies
            .into_iter()
            .filter(|cookie| domain::first_match(&cookie.domain, domains).is_some())
            .map(|cookie| cookie_store.delete_cookie(cookie))
            .collect();
        let issued = deletes.len();

        match join::join_within("delete_cookie", deletes, self.config.remove_timeout()).await {
            Ok(summary) => tracing::debug!(
                issued,
                deleted = summary.succeeded,
                failed = summary.failed,
                "removed cookies for domains"
            ),
            Err(e) => tracing::warn!(issued, error = %e, "cookie removal did not finish in time"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cookies::datastore::MemoryDataStore;
    use crate::cookies::staging::MemoryStagingStore;
    use crate::policy::PreserveLogins;

    #[tokio::test]
    async fn test_state_returns_to_idle() {
        let manager = WebCacheManager::new();
        let mut states = manager.subscribe();
        let data_store = MemoryDataStore::new();
        let staging = Arc::new(MemoryStagingStore::new());
        let logins = PreserveLogins::new();

        assert_eq!(manager.state(), ClearState::Idle);
        manager.clear(&data_store, staging, &logins).await;
        assert_eq!(manager.state(), ClearState::Idle);
        assert!(states.has_changed().unwrap());
        assert_eq!(*states.borrow_and_update(), ClearState::Idle);
    }

    #[tokio::test]
    async fn test_clear_domain_strips_www() {
        let manager = WebCacheManager::new();
        let data_store = MemoryDataStore::new();
        let jar = data_store.cookie_jar().unwrap();
        jar.set_canonical_cookie(CanonicalCookie::session("a", "1", "example.com"));
        jar.set_canonical_cookie(CanonicalCookie::session("b", "1", "other.com"));

        manager
            .clear_domain("www.example.com", RecordType::Cookies, &data_store)
            .await;

        assert!(jar.cookies_for_domain("example.com").is_empty());
        assert_eq!(jar.cookies_for_domain("other.com").len(), 1);
    }

    #[tokio::test]
    async fn test_clear_domain_without_stripping() {
        let manager =
            WebCacheManager::with_config(WebCacheConfig::default().with_strip_www_prefix(false));
        let data_store = MemoryDataStore::new();
        let jar = data_store.cookie_jar().unwrap();
        jar.set_canonical_cookie(CanonicalCookie::session("a", "1", "example.com"));

        manager
            .clear_domain("www.example.com", RecordType::Cookies, &data_store)
            .await;

        assert_eq!(jar.total_cookie_count(), 1);
    }

    #[tokio::test]
    async fn test_custom_settings_domain() {
        let manager = WebCacheManager::with_config(
            WebCacheConfig::default().with_settings_domain("settings.example"),
        );
        let data_store = MemoryDataStore::new();
        let jar = data_store.cookie_jar().unwrap();
        jar.set_canonical_cookie(CanonicalCookie::session("s", "l", "settings.example"));
        jar.set_canonical_cookie(CanonicalCookie::session("s", "l", "duckduckgo.com"));
        let staging = Arc::new(MemoryStagingStore::new());

        manager
            .clear(&data_store, staging.clone(), &PreserveLogins::new())
            .await;

        let staged: Vec<String> = staging.cookies().into_iter().map(|c| c.domain).collect();
        assert_eq!(staged, vec!["settings.example".to_string()]);
    }
}
