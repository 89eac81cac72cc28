//! Cookie staging - the holding area for cookies that must survive a wipe.
//!
//! Extraction writes allow-listed cookies here before the live store is
//! wiped; restoration replays them and then empties the area. Entries are
//! keyed by `(domain, name)` and the last write wins.
//!
//! Two implementations are provided:
//! - [`MemoryStagingStore`]: process-local, for tests and hosts that persist elsewhere
//! - [`FileStagingStore`]: durable JSON file, rewritten on every mutation

use crate::base::cacheerror::CacheError;
use crate::base::context::{IoResultExt, JsonResultExt};
use crate::cookies::canonicalcookie::{CanonicalCookie, CookieKey, CookiePriority, SameSite};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::{Entry, HashMap};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use time::OffsetDateTime;

/// Holding area owned exclusively by the cache manager.
///
/// Calls are synchronous. The manager never overlaps extraction and
/// restoration on the same instance, but implementations must still be
/// `Send + Sync` because restoration clears from a blocking worker.
pub trait StagingStore: Send + Sync {
    /// Snapshot of every staged cookie.
    fn cookies(&self) -> Vec<CanonicalCookie>;

    /// Upsert by `(domain, name)`.
    fn set_cookie(&self, cookie: CanonicalCookie) -> Result<(), CacheError>;

    /// Upsert a batch, in order. Stops at the first failure.
    ///
    /// Durable stores should override this to write once per batch.
    fn set_cookies(&self, cookies: Vec<CanonicalCookie>) -> Result<(), CacheError> {
        for cookie in cookies {
            self.set_cookie(cookie)?;
        }
        Ok(())
    }

    /// Drop every staged cookie.
    fn clear(&self) -> Result<(), CacheError>;

    fn is_empty(&self) -> bool {
        self.cookies().is_empty()
    }
}

/// Process-local staging area.
#[derive(Default)]
pub struct MemoryStagingStore {
    cookies: DashMap<CookieKey, CanonicalCookie>,
}

impl MemoryStagingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.cookies.len()
    }
}

impl StagingStore for MemoryStagingStore {
    fn cookies(&self) -> Vec<CanonicalCookie> {
        self.cookies.iter().map(|e| e.value().clone()).collect()
    }

    fn set_cookie(&self, cookie: CanonicalCookie) -> Result<(), CacheError> {
        self.cookies.insert(cookie.key(), cookie);
        Ok(())
    }

    fn clear(&self) -> Result<(), CacheError> {
        self.cookies.clear();
        Ok(())
    }

    fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }
}

/// Serializable representation of a staged cookie.
#[derive(Serialize, Deserialize, Debug, Clone)]
struct PersistentCookie {
    name: String,
    value: String,
    domain: String,
    path: String,
    secure: bool,
    http_only: bool,
    host_only: bool,
    same_site: SameSite,
    priority: CookiePriority,
    created_unix_secs: i64,
    expires_unix_secs: Option<i64>,
}

impl From<&CanonicalCookie> for PersistentCookie {
    fn from(cookie: &CanonicalCookie) -> Self {
        Self {
            name: cookie.name.clone(),
            value: cookie.value.clone(),
            domain: cookie.domain.clone(),
            path: cookie.path.clone(),
            secure: cookie.secure,
            http_only: cookie.http_only,
            host_only: cookie.host_only,
            same_site: cookie.same_site,
            priority: cookie.priority,
            created_unix_secs: cookie.creation_time.unix_timestamp(),
            expires_unix_secs: cookie.expiration_time.map(|t| t.unix_timestamp()),
        }
    }
}

impl PersistentCookie {
    fn into_canonical(self, now: OffsetDateTime) -> CanonicalCookie {
        let creation_time =
            OffsetDateTime::from_unix_timestamp(self.created_unix_secs).unwrap_or(now);
        CanonicalCookie {
            name: self.name,
            value: self.value,
            domain: self.domain,
            path: self.path,
            creation_time,
            expiration_time: self
                .expires_unix_secs
                .and_then(|s| OffsetDateTime::from_unix_timestamp(s).ok()),
            last_access_time: now,
            secure: self.secure,
            http_only: self.http_only,
            host_only: self.host_only,
            same_site: self.same_site,
            priority: self.priority,
        }
    }
}

/// Durable staging area backed by a JSON file.
///
/// The file is loaded once on [`open`](FileStagingStore::open) and rewritten
/// in full (temp file + rename) after every mutation, so a crash between a
/// wipe and the next launch still leaves the preserved cookies on disk.
pub struct FileStagingStore {
    path: PathBuf,
    cookies: Mutex<Vec<CanonicalCookie>>,
}

impl FileStagingStore {
    /// Open (or lazily create) the staging file at `path`.
    ///
    /// A missing file is an empty staging area. A file that fails to decode
    /// is logged and also treated as empty; it is overwritten on the next
    /// mutation. Expired cookies are dropped while loading.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let path = path.into();
        let cookies = match fs::read_to_string(&path) {
            Ok(json) => match Self::decode(&json, &path) {
                Ok(cookies) => cookies,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "discarding corrupt staging file");
                    Vec::new()
                }
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(CacheError::staging_io(&path, e)),
        };

        tracing::debug!(path = %path.display(), count = cookies.len(), "opened staging file");
        Ok(Self {
            path,
            cookies: Mutex::new(cookies),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn decode(json: &str, path: &Path) -> Result<Vec<CanonicalCookie>, CacheError> {
        let persistent =
            serde_json::from_str::<Vec<PersistentCookie>>(json).corrupt_context(path)?;
        let now = OffsetDateTime::now_utc();

        Ok(persistent
            .into_iter()
            .map(|pc| pc.into_canonical(now))
            .filter(|c| !c.is_expired(now))
            .collect())
    }

    fn persist(&self, cookies: &[CanonicalCookie]) -> Result<(), CacheError> {
        let persistent: Vec<PersistentCookie> =
            cookies.iter().map(PersistentCookie::from).collect();
        let json = serde_json::to_string_pretty(&persistent)
            .map_err(|e| CacheError::staging_corrupt(&self.path, e.to_string()))?;

        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, json).staging_context(&tmp)?;
        fs::rename(&tmp, &self.path).staging_context(&self.path)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<CanonicalCookie>> {
        // A panic mid-update leaves a Vec that is still structurally valid.
        self.cookies.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl StagingStore for FileStagingStore {
    fn cookies(&self) -> Vec<CanonicalCookie> {
        self.lock().clone()
    }

    fn set_cookie(&self, cookie: CanonicalCookie) -> Result<(), CacheError> {
        self.set_cookies(vec![cookie])
    }

    fn set_cookies(&self, batch: Vec<CanonicalCookie>) -> Result<(), CacheError> {
        if batch.is_empty() {
            return Ok(());
        }
        let mut cookies = self.lock();
        let mut index: HashMap<CookieKey, usize> = cookies
            .iter()
            .enumerate()
            .map(|(i, c)| (c.key(), i))
            .collect();
        for cookie in batch {
            match index.entry(cookie.key()) {
                Entry::Occupied(slot) => cookies[*slot.get()] = cookie,
                Entry::Vacant(slot) => {
                    slot.insert(cookies.len());
                    cookies.push(cookie);
                }
            }
        }
        self.persist(&cookies)
    }

    fn clear(&self) -> Result<(), CacheError> {
        let mut cookies = self.lock();
        // Memory must keep mirroring the file when the delete fails.
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(CacheError::staging_io(&self.path, e)),
        }
        cookies.clear();
        Ok(())
    }

    fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_memory_last_write_wins() {
        let staging = MemoryStagingStore::new();
        staging
            .set_cookie(CanonicalCookie::session("sid", "old", "example.com"))
            .unwrap();
        staging
            .set_cookie(CanonicalCookie::session("sid", "new", "example.com"))
            .unwrap();
        staging
            .set_cookie(CanonicalCookie::session("sid", "x", ".example.com"))
            .unwrap();

        assert_eq!(staging.len(), 2);
        let values: Vec<String> = staging
            .cookies()
            .into_iter()
            .filter(|c| c.domain == "example.com")
            .map(|c| c.value)
            .collect();
        assert_eq!(values, vec!["new".to_string()]);

        staging.clear().unwrap();
        assert!(staging.is_empty());
    }

    #[test]
    fn test_file_survives_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("staged_cookies.json");

        {
            let staging = FileStagingStore::open(&path).unwrap();
            assert!(staging.is_empty());

            let mut cookie = CanonicalCookie::session("s", "l", "duckduckgo.com");
            cookie.secure = true;
            cookie.same_site = SameSite::Strict;
            staging.set_cookie(cookie).unwrap();
        }

        let reopened = FileStagingStore::open(&path).unwrap();
        let cookies = reopened.cookies();
        assert_eq!(cookies.len(), 1);
        assert_eq!(cookies[0].name, "s");
        assert_eq!(cookies[0].value, "l");
        assert!(cookies[0].secure);
        assert_eq!(cookies[0].same_site, SameSite::Strict);
    }

    #[test]
    fn test_file_upsert_and_clear() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("staged_cookies.json");
        let staging = FileStagingStore::open(&path).unwrap();

        staging
            .set_cookie(CanonicalCookie::session("sid", "1", "example.com"))
            .unwrap();
        staging
            .set_cookie(CanonicalCookie::session("sid", "2", "example.com"))
            .unwrap();
        assert_eq!(staging.cookies().len(), 1);
        assert_eq!(staging.cookies()[0].value, "2");

        staging.clear().unwrap();
        assert!(staging.is_empty());
        assert!(!path.exists());
        // Clearing twice is fine.
        staging.clear().unwrap();
    }

    #[test]
    fn test_file_batch_upserts_in_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("staged_cookies.json");
        let staging = FileStagingStore::open(&path).unwrap();
        staging
            .set_cookie(CanonicalCookie::session("sid", "old", "example.com"))
            .unwrap();

        staging
            .set_cookies(vec![
                CanonicalCookie::session("sid", "mid", "example.com"),
                CanonicalCookie::session("s", "l", "duckduckgo.com"),
                CanonicalCookie::session("sid", "new", "example.com"),
            ])
            .unwrap();
        staging.set_cookies(Vec::new()).unwrap();

        let reopened = FileStagingStore::open(&path).unwrap();
        let mut cookies = reopened.cookies();
        cookies.sort_by(|a, b| a.name.cmp(&b.name));
        assert_eq!(cookies.len(), 2);
        assert_eq!(cookies[0].value, "l");
        assert_eq!(cookies[1].value, "new");
    }

    #[test]
    fn test_file_failed_clear_keeps_cookies() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("staged_cookies.json");
        let staging = FileStagingStore::open(&path).unwrap();
        staging
            .set_cookie(CanonicalCookie::session("sid", "1", "example.com"))
            .unwrap();

        // A directory in place of the file makes the delete fail.
        fs::remove_file(&path).unwrap();
        fs::create_dir(&path).unwrap();

        let err = staging.clear().unwrap_err();
        assert!(err.is_staging_error());
        assert_eq!(staging.cookies().len(), 1);
    }

    #[test]
    fn test_file_corrupt_is_treated_as_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("staged_cookies.json");
        fs::write(&path, "{ definitely not a cookie list").unwrap();

        let staging = FileStagingStore::open(&path).unwrap();
        assert!(staging.is_empty());

        staging
            .set_cookie(CanonicalCookie::session("sid", "1", "example.com"))
            .unwrap();
        let reopened = FileStagingStore::open(&path).unwrap();
        assert_eq!(reopened.cookies().len(), 1);
    }

    #[test]
    fn test_file_drops_expired_on_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("staged_cookies.json");
        let staging = FileStagingStore::open(&path).unwrap();

        let mut expired = CanonicalCookie::session("old", "1", "example.com");
        expired.expiration_time = Some(OffsetDateTime::now_utc() - time::Duration::days(1));
        staging.set_cookie(expired).unwrap();
        staging
            .set_cookie(CanonicalCookie::session("new", "1", "example.com"))
            .unwrap();

        let reopened = FileStagingStore::open(&path).unwrap();
        let names: Vec<String> = reopened.cookies().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["new".to_string()]);
    }
}
