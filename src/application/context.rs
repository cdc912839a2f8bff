//! Per-request client context resolution.
//!
//! Tracking calls carry an explicitly injected [`RequestContext`] (remote
//! address, headers, cookies, user agent) instead of reading process-global
//! request state. From it the resolver derives a best-effort client IP
//! honoring a trusted-proxy chain, and a numeric analytics UID from the
//! first-party cookies. Resolution never fails; unresolvable fields are
//! simply absent from the hit.

use crate::domain::validation::validate_ip;
use std::collections::{BTreeMap, BTreeSet};
use std::net::ToSocketAddrs;

/// Forwarding headers consulted when the connecting peer is a trusted proxy,
/// in priority order.
const FORWARDED_HEADERS: [&str; 4] = [
    "X-Forwarded-For",
    "X-Forwarded",
    "X-Cluster-Client-IP",
    "Client-IP",
];

/// Ambient request data for one tracking call.
///
/// Long-lived workers track many unrelated external requests, so this is
/// rebuilt per call rather than cached on the tracker.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    remote_addr: Option<String>,
    headers: BTreeMap<String, String>,
    cookies: BTreeMap<String, String>,
    user_agent: Option<String>,
}

impl RequestContext {
    /// Empty context: no connection, no headers, no cookies.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the immediate connection's remote address.
    pub fn with_remote_addr(mut self, addr: impl Into<String>) -> Self {
        self.remote_addr = Some(addr.into());
        self
    }

    /// Add a request header. Lookup is case-insensitive.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Add a request cookie.
    pub fn with_cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.insert(name.into(), value.into());
        self
    }

    /// Set the requesting user agent.
    pub fn with_user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// The immediate connection's remote address, if any.
    pub fn remote_addr(&self) -> Option<&str> {
        self.remote_addr.as_deref()
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Cookie lookup by exact name.
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    /// The requesting user agent, if any.
    pub fn user_agent(&self) -> Option<&str> {
        self.user_agent.as_deref()
    }
}

/// Context resolved for one tracked event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientContext {
    /// Validated client IP, absent when nothing resolved.
    pub ip: Option<String>,
    /// User agent string, copied through from the request.
    pub user_agent: Option<String>,
    /// Numeric analytics UID from the first-party cookies; 0 means
    /// unresolved and must be omitted from the payload.
    pub uid: u64,
}

/// Resolve the full client context for one tracking call.
pub fn resolve(
    ctx: &RequestContext,
    trusted_proxies: &BTreeSet<String>,
    extra_proxies: &[String],
) -> ClientContext {
    ClientContext {
        ip: resolve_client_ip(ctx, trusted_proxies, extra_proxies),
        user_agent: ctx.user_agent().map(str::to_string),
        uid: resolve_uid(ctx),
    }
}

/// Derive the client IP from the request, honoring the trusted-proxy chain.
///
/// The immediate remote address is the baseline candidate. Forwarding headers
/// are consulted only when that address is a member of the trusted-proxy
/// union; an untrusted peer cannot inject a forwarded IP. Header candidates
/// are the first comma-separated token, trimmed, first valid one wins. When
/// nothing validated as an IP, a hostname resolution fallback is attempted on
/// whatever string was collected before giving up and omitting the field.
pub fn resolve_client_ip(
    ctx: &RequestContext,
    trusted_proxies: &BTreeSet<String>,
    extra_proxies: &[String],
) -> Option<String> {
    let remote = ctx.remote_addr();
    let resolved: Option<String> = remote
        .filter(|addr| validate_ip(addr))
        .map(str::to_string);

    let peer_is_trusted_proxy = resolved.as_deref().is_some_and(|addr| {
        trusted_proxies.contains(addr) || extra_proxies.iter().any(|proxy| proxy == addr)
    });

    if peer_is_trusted_proxy {
        for name in FORWARDED_HEADERS {
            if let Some(raw) = ctx.header(name) {
                let first = raw.split(',').next().unwrap_or("").trim();
                if validate_ip(first) {
                    return Some(first.to_string());
                }
            }
        }
        // No forwarded candidate validated; the peer's own address stands.
        return resolved;
    }

    if resolved.is_none() {
        // The remote address was collected but is not an IP literal.
        return remote.and_then(resolve_hostname);
    }

    resolved
}

/// Forward-resolve a hostname string to an IP, mirroring the original's
/// `gethostbyname` fallback. Returns `None` when resolution fails.
fn resolve_hostname(host: &str) -> Option<String> {
    if host.is_empty() {
        return None;
    }
    (host, 0)
        .to_socket_addrs()
        .ok()?
        .next()
        .map(|addr| addr.ip().to_string())
}

/// Read the numeric analytics UID from the first-party cookies.
///
/// The `_ga` cookie (`GA<format>.<domain>.<uid>.<first-visit>`) is preferred;
/// the legacy `__utma`
/// (`<domain>.<uid>.<first-visit>.<previous-visit>.<session-start>.<visit-count>`)
/// is consulted only when `_ga` is absent. Returns 0 when neither cookie is
/// present or the positional parse fails; 0 is the "unresolved" sentinel and
/// is never sent on the wire.
pub fn resolve_uid(ctx: &RequestContext) -> u64 {
    if let Some(ga) = ctx.cookie("_ga") {
        return parse_uid_token(ga.strip_prefix("GA").unwrap_or(""), 2);
    }
    if let Some(utma) = ctx.cookie("__utma") {
        return parse_uid_token(utma, 1);
    }
    0
}

/// Pull the dot-separated token at `index` and parse it as the UID.
fn parse_uid_token(value: &str, index: usize) -> u64 {
    value
        .split('.')
        .nth(index)
        .and_then(|token| token.parse::<u64>().ok())
        .unwrap_or(0)
}
