//! Cookie domain matching.
//!
//! Deliberately narrower than RFC 6265 domain matching: a cookie domain
//! matches a target when the two are equal, or when the cookie domain starts
//! with `.` and the target ends with it. `.example.com` therefore matches
//! `www.example.com` but not the bare `example.com`.

/// Prefix dropped from domains before domain-scoped website data removal.
pub const WWW_PREFIX: &str = "www.";

/// Decide whether `cookie_domain` covers `target_domain`.
pub fn matches(cookie_domain: &str, target_domain: &str) -> bool {
    cookie_domain == target_domain
        || (cookie_domain.starts_with('.') && target_domain.ends_with(cookie_domain))
}

/// Strip a single leading `www.` from `domain`.
///
/// Website data records are commonly stored against the bare domain.
pub fn strip_www(domain: &str) -> &str {
    domain.strip_prefix(WWW_PREFIX).unwrap_or(domain)
}

/// Return the first of `domains` that `cookie_domain` matches.
pub fn first_match<'a, I>(cookie_domain: &str, domains: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a String>,
{
    domains
        .into_iter()
        .map(String::as_str)
        .find(|target| matches(cookie_domain, target))
}
