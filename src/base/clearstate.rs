/// What a [`WebCacheManager`](crate::manager::WebCacheManager) is doing right now.
///
/// A full clear walks `Idle -> Extracting -> Wiping -> Idle`. Restoration
/// and domain-scoped removal report their own phase while running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClearState {
    /// Nothing in flight.
    #[default]
    Idle,

    /// Copying allow-listed cookies into the staging area.
    Extracting,

    /// Waiting for the data store to delete everything.
    Wiping,

    /// Waiting for the data store to delete one domain's records.
    WipingDomain,

    /// Replaying staged cookies into the live store.
    Restoring,

    /// Deleting cookies that match a set of domains.
    RemovingCookies,
}

impl ClearState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClearState::Idle => "idle",
            ClearState::Extracting => "extracting",
            ClearState::Wiping => "wiping",
            ClearState::WipingDomain => "wiping_domain",
            ClearState::Restoring => "restoring",
            ClearState::RemovingCookies => "removing_cookies",
        }
    }
}
