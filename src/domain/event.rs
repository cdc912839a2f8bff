//! Event model for queued telemetry hits.
//!
//! An [`Event`] is one pending unit of telemetry: the hit kind, the flat
//! field set that will become the wire payload, and the caller-supplied
//! properties and metrics that are validated but not merged into the hit.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

/// Closed set of hit kinds understood by the collection endpoint.
///
/// Each kind determines which fields are mandatory when building the hit and
/// how the kind itself is encoded: `NonInteractive` sets `ni=1`, every other
/// kind sets `t=<code>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Session start/end markers and other hits that must not affect
    /// bounce/engagement figures.
    NonInteractive,
    /// Generic category/action event.
    Event,
    /// Application exception.
    Exception,
    /// Web page view.
    PageView,
    /// Mobile/app screen view.
    ScreenView,
    /// E-commerce transaction.
    Transaction,
    /// E-commerce transaction line item.
    Item,
    /// Social network interaction.
    Social,
    /// User timing measurement.
    Timing,
}

impl EventKind {
    /// Wire code for this kind, as sent in the `t` parameter.
    pub fn code(&self) -> &'static str {
        match self {
            EventKind::NonInteractive => "ni",
            EventKind::Event => "event",
            EventKind::Exception => "exception",
            EventKind::PageView => "pageview",
            EventKind::ScreenView => "screenview",
            EventKind::Transaction => "transaction",
            EventKind::Item => "item",
            EventKind::Social => "social",
            EventKind::Timing => "timing",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Scalar value of one hit field.
///
/// The wire format is flat text, so every variant renders to a string when
/// the payload is encoded. Booleans render as `1`/`0`.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl FieldValue {
    /// Whether this value is a string.
    pub fn is_str(&self) -> bool {
        matches!(self, FieldValue::Str(_))
    }

    /// Whether this value is numeric (integer or floating point).
    pub fn is_numeric(&self) -> bool {
        matches!(self, FieldValue::Int(_) | FieldValue::Float(_))
    }

    /// Render the value as it appears on the wire, before URL encoding.
    pub fn to_wire(&self) -> Cow<'_, str> {
        match self {
            FieldValue::Str(s) => Cow::Borrowed(s.as_str()),
            FieldValue::Int(i) => Cow::Owned(i.to_string()),
            FieldValue::Float(x) => Cow::Owned(x.to_string()),
            FieldValue::Bool(true) => Cow::Borrowed("1"),
            FieldValue::Bool(false) => Cow::Borrowed("0"),
        }
    }

    /// The string payload, if this value is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Str(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Str(s)
    }
}

impl From<i64> for FieldValue {
    fn from(i: i64) -> Self {
        FieldValue::Int(i)
    }
}

impl From<f64> for FieldValue {
    fn from(x: f64) -> Self {
        FieldValue::Float(x)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

/// Flat field set of one hit, keyed by the protocol's short parameter names.
///
/// A `BTreeMap` keeps the encoded payload deterministic.
pub type HitData = BTreeMap<String, FieldValue>;

/// One queued telemetry unit.
///
/// Created by the tracker when an event passes validation; consumed by the
/// flusher when the queue drains. No `Event` survives past a flush.
#[derive(Debug, Clone)]
pub struct Event {
    /// Hit kind.
    pub kind: EventKind,
    /// Logical event name (currently always the kind's wire code).
    pub name: String,
    /// Field set that becomes the wire payload.
    pub data: HitData,
    /// Caller-supplied properties; validated all-string, not merged into the
    /// payload.
    pub props: HitData,
    /// Caller-supplied metrics; validated all-numeric, not merged into the
    /// payload.
    pub metrics: HitData,
    /// Creation time, whole seconds since the Unix epoch.
    pub time: u64,
}

impl Event {
    /// Create an event with empty props and metrics.
    pub fn new(kind: EventKind, data: HitData, time: u64) -> Self {
        Self {
            kind,
            name: kind.code().to_string(),
            data,
            props: HitData::new(),
            metrics: HitData::new(),
            time,
        }
    }
}
