//! # webcache
//!
//! Fire Button data clearing with selective cookie retention.
//!
//! A browser's "clear all data" action must not log users out of sites they
//! chose to stay signed in to, nor reset the search settings that live in
//! cookies. `webcache` copies those cookies into a staging area, wipes every
//! kind of website data, and replays the staged cookies on the next launch.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use webcache::cookies::datastore::MemoryDataStore;
//! use webcache::cookies::staging::FileStagingStore;
//! use webcache::cookies::store::DataStore;
//! use webcache::manager::WebCacheManager;
//! use webcache::policy::PreserveLogins;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), webcache::base::cacheerror::CacheError> {
//!     let manager = WebCacheManager::new();
//!     let data_store = MemoryDataStore::new();
//!     let staging = Arc::new(FileStagingStore::open("staged_cookies.json")?);
//!     let logins = PreserveLogins::from_domains(["example.com"]);
//!
//!     // Fire Button
//!     manager.clear(&data_store, staging.as_ref(), &logins).await;
//!
//!     // Next launch
//!     manager.consume_cookies(staging, data_store.cookie_store()).await;
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`base`] - Error type and operation state
//! - [`cookies`] - Cookie model, domain matching, live and staging stores
//! - [`policy`] - Allow-list oracle and the retention decision
//! - [`manager`] - Clear, restore and domain-scoped removal

pub mod base;
pub mod cookies;
pub mod manager;
pub mod policy;
