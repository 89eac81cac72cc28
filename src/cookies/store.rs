//! Capability traits over the host's live cookie and website data stores.
//!
//! The host runtime owns the authoritative stores; this crate only issues
//! commands against them. Every call is a suspension point, so the traits
//! return boxed futures for trait object compatibility, the same way the
//! resolver abstraction in `chromenet` does.

use crate::base::cacheerror::CacheError;
use crate::cookies::canonicalcookie::CanonicalCookie;
use std::{future::Future, pin::Pin, sync::Arc};

/// Future resolving to a snapshot of every cookie in a store.
pub type CookiesFuture = Pin<Box<dyn Future<Output = Result<Vec<CanonicalCookie>, CacheError>> + Send>>;

/// Future resolving once a store mutation has been acknowledged.
pub type StoreOpFuture = Pin<Box<dyn Future<Output = Result<(), CacheError>> + Send>>;

/// The live cookie store of the runtime environment.
///
/// Implementations are responsible for their own internal synchronisation.
/// Deletion identity is implementation-defined.
pub trait CookieStore: Send + Sync {
    /// Enumerate every cookie in a single bulk read.
    fn get_all_cookies(&self) -> CookiesFuture;

    /// Insert or replace one cookie.
    fn set_cookie(&self, cookie: CanonicalCookie) -> StoreOpFuture;

    /// Delete one cookie.
    fn delete_cookie(&self, cookie: CanonicalCookie) -> StoreOpFuture;
}

/// Blanket implementation for Arc-wrapped stores.
impl<S: CookieStore + ?Sized> CookieStore for Arc<S> {
    fn get_all_cookies(&self) -> CookiesFuture {
        (**self).get_all_cookies()
    }

    fn set_cookie(&self, cookie: CanonicalCookie) -> StoreOpFuture {
        (**self).set_cookie(cookie)
    }

    fn delete_cookie(&self, cookie: CanonicalCookie) -> StoreOpFuture {
        (**self).delete_cookie(cookie)
    }
}

/// Categories of website data a data store keeps per site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum WebsiteDataType {
    Cookies,
    DiskCache,
    MemoryCache,
    OfflineWebApplicationCache,
    LocalStorage,
    SessionStorage,
    IndexedDbDatabases,
    WebSqlDatabases,
    FetchCache,
    ServiceWorkerRegistrations,
}

impl WebsiteDataType {
    pub const ALL: [WebsiteDataType; 10] = [
        WebsiteDataType::Cookies,
        WebsiteDataType::DiskCache,
        WebsiteDataType::MemoryCache,
        WebsiteDataType::OfflineWebApplicationCache,
        WebsiteDataType::LocalStorage,
        WebsiteDataType::SessionStorage,
        WebsiteDataType::IndexedDbDatabases,
        WebsiteDataType::WebSqlDatabases,
        WebsiteDataType::FetchCache,
        WebsiteDataType::ServiceWorkerRegistrations,
    ];
}

/// Selects what a domain-scoped removal targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordType {
    /// Cookies only.
    Cookies,
    /// Every website data category (cache, local storage, ...).
    AllData,
}

impl RecordType {
    pub fn all_values() -> &'static [RecordType] {
        &[RecordType::Cookies, RecordType::AllData]
    }

    /// Website data categories this record type covers.
    pub fn data_types(&self) -> &'static [WebsiteDataType] {
        match self {
            RecordType::Cookies => &[WebsiteDataType::Cookies],
            RecordType::AllData => &WebsiteDataType::ALL,
        }
    }
}

/// The host's website data store.
pub trait DataStore: Send + Sync {
    /// Cookie sub-interface; `None` when the environment lacks one.
    fn cookie_store(&self) -> Option<Arc<dyn CookieStore>>;

    /// Remove every data type regardless of age.
    fn remove_all_data(&self) -> StoreOpFuture;

    /// Remove the records of `record_type` whose display name starts with `domain`.
    fn remove_all_data_for_domain(&self, domain: &str, record_type: RecordType) -> StoreOpFuture;
}

impl<D: DataStore + ?Sized> DataStore for Arc<D> {
    fn cookie_store(&self) -> Option<Arc<dyn CookieStore>> {
        (**self).cookie_store()
    }

    fn remove_all_data(&self) -> StoreOpFuture {
        (**self).remove_all_data()
    }

    fn remove_all_data_for_domain(&self, domain: &str, record_type: RecordType) -> StoreOpFuture {
        (**self).remove_all_data_for_domain(domain, record_type)
    }
}
