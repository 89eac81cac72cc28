//! Cookie data model and the stores cookies move between.
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | [`canonicalcookie`] | Single cookie representation and its staging key |
//! | [`domain`] | Exact / leading-dot cookie domain matching |
//! | [`store`] | Capability traits over the host's live cookie and data stores |
//! | [`monster`] | In-memory live cookie store |
//! | [`datastore`] | In-memory website data store built on [`monster`] |
//! | [`staging`] | Holding area for cookies that survive a wipe |
//!
//! Cookies flow `live store -> staging` during a Fire Button clear and
//! `staging -> live store` on the next launch.

pub mod canonicalcookie;
pub mod datastore;
pub mod domain;
pub mod monster;
pub mod staging;
pub mod store;
