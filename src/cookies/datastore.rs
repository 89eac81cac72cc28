//! In-memory website data store.
//!
//! Stands in for the host runtime's data store: a [`CookieMonster`] for the
//! cookie sub-interface plus per-site records for the other website data
//! categories (caches, local storage, ...). It can be built without a cookie
//! store to model environments that lack one.

use crate::cookies::monster::CookieMonster;
use crate::cookies::store::{CookieStore, DataStore, RecordType, StoreOpFuture, WebsiteDataType};
use dashmap::DashMap;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// Website data held for one site, identified by its display name
/// (usually the bare registrable domain).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebsiteDataRecord {
    pub display_name: String,
    pub data_types: BTreeSet<WebsiteDataType>,
}

impl WebsiteDataRecord {
    pub fn new(display_name: impl Into<String>, data_types: &[WebsiteDataType]) -> Self {
        Self {
            display_name: display_name.into(),
            data_types: data_types.iter().copied().collect(),
        }
    }
}

pub struct MemoryDataStore {
    cookies: Option<CookieMonster>,
    records: Arc<DashMap<String, BTreeSet<WebsiteDataType>>>,
}

impl Default for MemoryDataStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDataStore {
    pub fn new() -> Self {
        Self::with_cookie_jar(CookieMonster::new())
    }

    /// Share an existing jar as the cookie sub-interface.
    pub fn with_cookie_jar(jar: CookieMonster) -> Self {
        Self {
            cookies: Some(jar),
            records: Arc::new(DashMap::new()),
        }
    }

    /// A data store whose environment has no cookie sub-interface.
    pub fn without_cookie_store() -> Self {
        Self {
            cookies: None,
            records: Arc::new(DashMap::new()),
        }
    }

    pub fn cookie_jar(&self) -> Option<&CookieMonster> {
        self.cookies.as_ref()
    }

    /// Record non-cookie website data for a site.
    pub fn add_record(&self, record: WebsiteDataRecord) {
        self.records
            .entry(record.display_name)
            .or_default()
            .extend(record.data_types);
    }

    /// Snapshot of every record. Sites with cookies in the jar report the
    /// `Cookies` type under their dot-less domain.
    pub fn records(&self) -> Vec<WebsiteDataRecord> {
        let mut merged: BTreeMap<String, BTreeSet<WebsiteDataType>> = BTreeMap::new();
        for entry in self.records.iter() {
            merged
                .entry(entry.key().clone())
                .or_default()
                .extend(entry.value().iter().copied());
        }
        if let Some(jar) = &self.cookies {
            for cookie in jar.iter_all_cookies() {
                merged
                    .entry(cookie.domain.trim_start_matches('.').to_string())
                    .or_default()
                    .insert(WebsiteDataType::Cookies);
            }
        }

        merged
            .into_iter()
            .map(|(display_name, data_types)| WebsiteDataRecord {
                display_name,
                data_types,
            })
            .collect()
    }
}

impl DataStore for MemoryDataStore {
    fn cookie_store(&self) -> Option<Arc<dyn CookieStore>> {
        self.cookies
            .clone()
            .map(|jar| Arc::new(jar) as Arc<dyn CookieStore>)
    }

    fn remove_all_data(&self) -> StoreOpFuture {
        let jar = self.cookies.clone();
        let records = Arc::clone(&self.records);
        Box::pin(async move {
            let record_count = records.len();
            records.clear();
            let cookie_count = jar.map(|jar| {
                let n = jar.total_cookie_count();
                jar.clear();
                n
            });
            tracing::debug!(records = record_count, cookies = ?cookie_count, "removed all website data");
            Ok(())
        })
    }

    fn remove_all_data_for_domain(&self, domain: &str, record_type: RecordType) -> StoreOpFuture {
        let jar = self.cookies.clone();
        let records = Arc::clone(&self.records);
        let domain = domain.to_string();
        let types = record_type.data_types();

        Box::pin(async move {
            let mut removed_records = 0usize;
            records.retain(|display_name, data_types| {
                if !display_name.starts_with(&domain) {
                    return true;
                }
                let before = data_types.len();
                data_types.retain(|t| !types.contains(t));
                removed_records += usize::from(data_types.len() != before);
                !data_types.is_empty()
            });

            let removed_cookies = match jar {
                Some(jar) if types.contains(&WebsiteDataType::Cookies) => {
                    jar.remove_domains_with_prefix(&domain)
                }
                _ => 0,
            };

            tracing::debug!(
                domain = %domain,
                record_type = ?record_type,
                records = removed_records,
                cookies = removed_cookies,
                "removed website data for domain"
            );
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cookies::canonicalcookie::CanonicalCookie;

    fn populated() -> MemoryDataStore {
        let store = MemoryDataStore::new();
        let jar = store.cookie_jar().unwrap();
        jar.set_canonical_cookie(CanonicalCookie::session("a", "1", ".example.com"));
        jar.set_canonical_cookie(CanonicalCookie::session("b", "1", "other.com"));
        store.add_record(WebsiteDataRecord::new(
            "example.com",
            &[WebsiteDataType::DiskCache, WebsiteDataType::LocalStorage],
        ));
        store.add_record(WebsiteDataRecord::new(
            "other.com",
            &[WebsiteDataType::DiskCache],
        ));
        store
    }

    #[tokio::test]
    async fn test_remove_all_data() {
        let store = populated();
        store.remove_all_data().await.unwrap();

        assert!(store.records().is_empty());
        assert_eq!(store.cookie_jar().unwrap().total_cookie_count(), 0);
    }

    #[tokio::test]
    async fn test_remove_cookies_for_domain_keeps_other_types() {
        let store = populated();
        store
            .remove_all_data_for_domain("example.com", RecordType::Cookies)
            .await
            .unwrap();

        let jar = store.cookie_jar().unwrap();
        assert!(jar.cookies_for_domain(".example.com").is_empty());
        assert_eq!(jar.cookies_for_domain("other.com").len(), 1);

        let records = store.records();
        let example = records
            .iter()
            .find(|r| r.display_name == "example.com")
            .unwrap();
        assert!(example.data_types.contains(&WebsiteDataType::DiskCache));
        assert!(!example.data_types.contains(&WebsiteDataType::Cookies));
    }

    #[tokio::test]
    async fn test_remove_all_types_for_domain() {
        let store = populated();
        store
            .remove_all_data_for_domain("example.com", RecordType::AllData)
            .await
            .unwrap();

        let names: Vec<String> = store.records().into_iter().map(|r| r.display_name).collect();
        assert_eq!(names, vec!["other.com".to_string()]);
    }

    #[test]
    fn test_without_cookie_store() {
        let store = MemoryDataStore::without_cookie_store();
        assert!(store.cookie_store().is_none());
        assert!(store.cookie_jar().is_none());
    }
}
