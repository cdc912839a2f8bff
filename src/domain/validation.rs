//! Shape validators for tracker input.
//!
//! Pure, side-effect-free checks over property/metric mappings, tracking-id
//! and GUID formats, and IP literals. Nothing here touches tracker state, so
//! each function is testable in isolation.

use crate::domain::event::HitData;
use regex::Regex;
use std::net::IpAddr;
use std::sync::OnceLock;

/// Property/tracking-id format: `UA-<4..10 digits>-<1..4 digits>`.
fn tracking_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^UA-\d{4,10}-\d{1,4}$").expect("tracking id pattern"))
}

/// Canonical 8-4-4-4-12 hexadecimal GUID, optionally brace-wrapped.
fn guid_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\{?[0-9A-Fa-f]{8}-[0-9A-Fa-f]{4}-[0-9A-Fa-f]{4}-[0-9A-Fa-f]{4}-[0-9A-Fa-f]{12}\}?$")
            .expect("guid pattern")
    })
}

/// Check that every property value is a string.
///
/// The empty mapping is valid.
pub fn validate_props(props: &HitData) -> bool {
    props.values().all(|value| value.is_str())
}

/// Check that every metric value is numeric (integer or floating point).
///
/// The empty mapping is valid.
pub fn validate_metrics(metrics: &HitData) -> bool {
    metrics.values().all(|value| value.is_numeric())
}

/// Check a web/app property tracking id against the `UA-XXXX-Y` format.
pub fn validate_tracking_id(id: &str) -> bool {
    tracking_id_pattern().is_match(id)
}

/// Check that a client id is a GUID.
///
/// The collection protocol requires the `cid` parameter to be a UUID per
/// RFC 4122. Case-insensitive; surrounding braces are tolerated. Empty
/// strings fail.
pub fn validate_guid(id: &str) -> bool {
    !id.is_empty() && guid_pattern().is_match(id)
}

/// Check that a string parses as an IPv4 or IPv6 address.
///
/// Syntactic check only; no reachability or resolution is attempted.
pub fn validate_ip(ip: &str) -> bool {
    ip.parse::<IpAddr>().is_ok()
}
