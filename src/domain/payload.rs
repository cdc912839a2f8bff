//! Wire payload construction.
//!
//! Hits are flat key/value sets encoded as `application/x-www-form-urlencoded`
//! text: the query string of a single-hit GET, or one line per hit in a
//! CRLF-joined batch POST body. Everything here is pure string assembly; the
//! flusher decides verbs, URLs and headers.

use crate::domain::event::{FieldValue, HitData};
use crate::domain::validation::validate_guid;

/// Build the body prefix shared by every hit in one flush.
///
/// Contains the protocol version, the tracker-wide tracking id (when
/// configured), the anonymize-IP flag and the `z` cache buster. Fields set on
/// an individual event override these at merge time.
pub fn shared_body(
    api_version: u32,
    web_tracking_id: Option<&str>,
    anonymize_ip: bool,
    now: u64,
) -> HitData {
    let mut body = HitData::new();
    body.insert("v".to_string(), FieldValue::Int(i64::from(api_version)));
    if let Some(tid) = web_tracking_id {
        body.insert("tid".to_string(), FieldValue::from(tid));
    }
    if anonymize_ip {
        body.insert("aip".to_string(), FieldValue::Int(1));
    }
    body.insert("z".to_string(), FieldValue::Int(now as i64));
    body
}

/// Merge one event's fields over the shared body prefix.
///
/// Event fields win, so a hit-specific `tid` (an exception's app tracking id)
/// survives the merge on both the single-hit and batch paths.
pub fn merge(shared: &HitData, event_data: &HitData) -> HitData {
    let mut merged = shared.clone();
    for (key, value) in event_data {
        merged.insert(key.clone(), value.clone());
    }
    merged
}

/// Substitute the configured anonymous client id when `cid` is absent or not
/// a well-formed GUID.
pub fn apply_cid_fallback(data: &mut HitData, anonymous_cid: &str) {
    let valid = data
        .get("cid")
        .and_then(FieldValue::as_str)
        .is_some_and(validate_guid);
    if !valid {
        data.insert("cid".to_string(), FieldValue::from(anonymous_cid));
    }
}

/// URL-encode a field set into one wire line.
///
/// Keys are emitted in sorted order (the map is ordered), which keeps the
/// payload deterministic for identical input.
pub fn encode(data: &HitData) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in data {
        serializer.append_pair(key, &value.to_wire());
    }
    serializer.finish()
}

/// Build a single-hit query string: merge, apply the `cid` fallback, encode.
pub fn single_hit_query(shared: &HitData, event_data: &HitData, anonymous_cid: &str) -> String {
    let mut merged = merge(shared, event_data);
    apply_cid_fallback(&mut merged, anonymous_cid);
    encode(&merged)
}

/// Build a batch POST body: one encoded line per event, CRLF-joined with no
/// trailing terminator.
pub fn batch_body<'a, I>(shared: &HitData, events: I, anonymous_cid: &str) -> String
where
    I: IntoIterator<Item = &'a HitData>,
{
    let lines: Vec<String> = events
        .into_iter()
        .map(|data| single_hit_query(shared, data, anonymous_cid))
        .collect();
    lines.join("\r\n")
}
