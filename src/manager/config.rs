//! Manager configuration.

use crate::policy::SETTINGS_COOKIE_DOMAIN;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for [`WebCacheManager`](super::WebCacheManager).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebCacheConfig {
    /// Cookie domain that always survives a full clear (default: `duckduckgo.com`)
    pub settings_domain: String,
    /// Upper bound on waiting for domain-scoped cookie deletes, in milliseconds (default: 5000)
    pub remove_timeout_ms: u64,
    /// Drop a leading `www.` before domain-scoped data removal (default: true)
    pub strip_www_prefix: bool,
}

impl Default for WebCacheConfig {
    fn default() -> Self {
        Self {
            settings_domain: SETTINGS_COOKIE_DOMAIN.to_string(),
            remove_timeout_ms: 5000,
            strip_www_prefix: true,
        }
    }
}

impl WebCacheConfig {
    pub fn with_settings_domain(mut self, domain: impl Into<String>) -> Self {
        self.settings_domain = domain.into();
        self
    }

    pub fn with_remove_timeout(mut self, timeout: Duration) -> Self {
        self.remove_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn with_strip_www_prefix(mut self, strip: bool) -> Self {
        self.strip_www_prefix = strip;
        self
    }

    pub fn remove_timeout(&self) -> Duration {
        Duration::from_millis(self.remove_timeout_ms)
    }
}
