//! Base types and error handling.
//!
//! - [`CacheError`](cacheerror::CacheError): failures raised by store adapters and staging
//! - [`ClearState`](clearstate::ClearState): progress of the manager's current operation
//! - [`context`]: helpers attaching file context to IO errors

pub mod cacheerror;
pub mod clearstate;
pub mod context;

#[cfg(test)]
mod tests;
