//! Per-kind hit assembly.
//!
//! Each builder function checks the kind's mandatory/optional fields and
//! shapes them into the flat [`HitData`] record; [`enrich`] then applies the
//! cross-cutting fields every hit carries (kind encoding, client IP, user
//! agent, geo id, content language, UID, the exception tracking-id
//! override). A shape failure names the offending parameter and the event is
//! never enqueued.

use crate::application::context::ClientContext;
use crate::application::tracker::TrackerConfig;
use crate::domain::event::{EventKind, FieldValue, HitData};

/// Per-event shape failure. The offending parameter is recorded so the drop
/// can be logged usefully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A mandatory field was missing or malformed.
    InvalidParam(&'static str),
    /// A property value was not a string.
    InvalidProps,
    /// A metric value was not numeric.
    InvalidMetrics,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::InvalidParam(name) => write!(f, "invalid parameter `{}`", name),
            ValidationError::InvalidProps => write!(f, "given properties are invalid"),
            ValidationError::InvalidMetrics => write!(f, "given metrics are invalid"),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Exception description input: either a plain message or an error captured
/// with its type name. Resolved to the single `exd` string at this boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorInput {
    /// Free-form description.
    Message(String),
    /// Captured error: originating type and its rendered message.
    Captured { kind: String, message: String },
}

impl ErrorInput {
    /// Capture a concrete error value, keeping its type name alongside the
    /// rendered message.
    pub fn capture<E: std::error::Error>(err: &E) -> Self {
        ErrorInput::Captured {
            kind: std::any::type_name::<E>().to_string(),
            message: err.to_string(),
        }
    }

    /// The description that becomes the `exd` field.
    pub fn description(&self) -> &str {
        match self {
            ErrorInput::Message(msg) => msg,
            ErrorInput::Captured { message, .. } => message,
        }
    }
}

impl From<&str> for ErrorInput {
    fn from(msg: &str) -> Self {
        ErrorInput::Message(msg.to_string())
    }
}

impl From<String> for ErrorInput {
    fn from(msg: String) -> Self {
        ErrorInput::Message(msg)
    }
}

/// Which end of a session a marker hit records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEdge {
    Start,
    End,
}

impl SessionEdge {
    fn control_value(&self) -> &'static str {
        match self {
            SessionEdge::Start => "start",
            SessionEdge::End => "end",
        }
    }
}

fn require(name: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::InvalidParam(name));
    }
    Ok(())
}

fn require_nonnegative(name: &'static str, value: Option<f64>) -> Result<(), ValidationError> {
    if value.is_some_and(|x| !x.is_finite() || x < 0.0) {
        return Err(ValidationError::InvalidParam(name));
    }
    Ok(())
}

fn require_currency(name: &'static str, value: Option<&str>) -> Result<(), ValidationError> {
    if let Some(code) = value {
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ValidationError::InvalidParam(name));
        }
    }
    Ok(())
}

fn insert(data: &mut HitData, key: &str, value: impl Into<FieldValue>) {
    data.insert(key.to_string(), value.into());
}

fn insert_opt(data: &mut HitData, key: &str, value: Option<impl Into<FieldValue>>) {
    if let Some(value) = value {
        insert(data, key, value);
    }
}

/// Session start/end marker: a non-interactive hit pinned to the site root.
pub fn session_marker(cid: &str, edge: SessionEdge) -> HitData {
    let mut data = HitData::new();
    insert(&mut data, "cid", cid);
    insert(&mut data, "sc", edge.control_value());
    insert(&mut data, "dp", "/");
    data
}

/// Page view: hostname, page path and title, with the path normalized to
/// start with `/`.
pub fn page_view(
    cid: &str,
    hostname: &str,
    page: &str,
    title: &str,
) -> Result<HitData, ValidationError> {
    require("hostname", hostname)?;
    require("page", page)?;
    require("title", title)?;

    let path = if page.starts_with('/') {
        page.to_string()
    } else {
        format!("/{}", page)
    };

    let mut data = HitData::new();
    insert(&mut data, "cid", cid);
    insert(&mut data, "dh", hostname);
    insert(&mut data, "dp", path);
    insert(&mut data, "dt", title);
    Ok(data)
}

/// Generic event: category and action, optional label and integer value.
pub fn event(
    cid: &str,
    category: &str,
    action: &str,
    label: Option<&str>,
    value: Option<i64>,
) -> Result<HitData, ValidationError> {
    require("category", category)?;
    require("action", action)?;

    let mut data = HitData::new();
    insert(&mut data, "cid", cid);
    insert(&mut data, "ec", category);
    insert(&mut data, "ea", action);
    insert_opt(&mut data, "el", label);
    insert_opt(&mut data, "ev", value);
    Ok(data)
}

/// E-commerce transaction. Money fields must be nonnegative; the currency
/// code, when given, is three letters.
#[allow(clippy::too_many_arguments)]
pub fn transaction(
    cid: &str,
    txn_id: &str,
    affiliation: Option<&str>,
    revenue: Option<f64>,
    shipping: Option<f64>,
    tax: Option<f64>,
    currency: Option<&str>,
) -> Result<HitData, ValidationError> {
    require("txn_id", txn_id)?;
    if affiliation.is_some_and(str::is_empty) {
        return Err(ValidationError::InvalidParam("affiliation"));
    }
    require_nonnegative("revenue", revenue)?;
    require_nonnegative("shipping", shipping)?;
    require_nonnegative("tax", tax)?;
    require_currency("currency", currency)?;

    let mut data = HitData::new();
    insert(&mut data, "cid", cid);
    insert(&mut data, "ti", txn_id);
    insert_opt(&mut data, "ta", affiliation);
    insert_opt(&mut data, "tr", revenue);
    insert_opt(&mut data, "ts", shipping);
    insert_opt(&mut data, "tt", tax);
    insert_opt(&mut data, "cu", currency);
    Ok(data)
}

/// Line item of a transaction, linked by the transaction id.
#[allow(clippy::too_many_arguments)]
pub fn transaction_item(
    cid: &str,
    txn_id: &str,
    name: &str,
    price: Option<f64>,
    quantity: Option<i64>,
    sku: Option<&str>,
    variation: Option<&str>,
    currency: Option<&str>,
) -> Result<HitData, ValidationError> {
    require("txn_id", txn_id)?;
    require("name", name)?;
    require_nonnegative("price", price)?;
    if quantity.is_some_and(|q| q < 1) {
        return Err(ValidationError::InvalidParam("quantity"));
    }
    if sku.is_some_and(str::is_empty) {
        return Err(ValidationError::InvalidParam("sku"));
    }
    if variation.is_some_and(str::is_empty) {
        return Err(ValidationError::InvalidParam("variation"));
    }
    require_currency("currency", currency)?;

    let mut data = HitData::new();
    insert(&mut data, "cid", cid);
    insert(&mut data, "ti", txn_id);
    insert(&mut data, "in", name);
    insert_opt(&mut data, "ip", price);
    insert_opt(&mut data, "iq", quantity);
    insert_opt(&mut data, "ic", sku);
    insert_opt(&mut data, "iv", variation);
    insert_opt(&mut data, "cu", currency);
    Ok(data)
}

/// Social interaction: action, network and target.
pub fn social(
    cid: &str,
    action: &str,
    network: &str,
    target: &str,
) -> Result<HitData, ValidationError> {
    require("action", action)?;
    require("network", network)?;
    require("target", target)?;

    let mut data = HitData::new();
    insert(&mut data, "cid", cid);
    insert(&mut data, "sa", action);
    insert(&mut data, "sn", network);
    insert(&mut data, "st", target);
    Ok(data)
}

/// Application exception: description and fatality flag.
pub fn exception(cid: &str, error: &ErrorInput, is_fatal: bool) -> HitData {
    let mut data = HitData::new();
    insert(&mut data, "cid", cid);
    insert(&mut data, "exd", error.description());
    insert(&mut data, "exf", is_fatal);
    data
}

/// User timing: category, variable and total time, plus the optional browser
/// load-time breakdown.
#[allow(clippy::too_many_arguments)]
pub fn user_timing(
    cid: &str,
    category: &str,
    variable: &str,
    time: i64,
    label: Option<&str>,
    dns_load_time: Option<i64>,
    page_download_time: Option<i64>,
    redirect_response_time: Option<i64>,
    tcp_connect_time: Option<i64>,
    server_response_time: Option<i64>,
) -> Result<HitData, ValidationError> {
    require("category", category)?;
    require("variable", variable)?;

    let mut data = HitData::new();
    insert(&mut data, "cid", cid);
    insert(&mut data, "utc", category);
    insert(&mut data, "utv", variable);
    insert(&mut data, "utt", time);
    insert_opt(&mut data, "utl", label);
    insert_opt(&mut data, "dns", dns_load_time);
    insert_opt(&mut data, "pdt", page_download_time);
    insert_opt(&mut data, "rrt", redirect_response_time);
    insert_opt(&mut data, "tcp", tcp_connect_time);
    insert_opt(&mut data, "srt", server_response_time);
    Ok(data)
}

/// App screen view: all identity fields are mandatory.
pub fn screen_view(
    cid: &str,
    app_name: &str,
    app_version: &str,
    app_id: &str,
    app_installer_id: &str,
    screen_name: &str,
) -> Result<HitData, ValidationError> {
    require("app_name", app_name)?;
    require("app_version", app_version)?;
    require("app_id", app_id)?;
    require("app_installer_id", app_installer_id)?;
    require("screen_name", screen_name)?;

    let mut data = HitData::new();
    insert(&mut data, "cid", cid);
    insert(&mut data, "an", app_name);
    insert(&mut data, "av", app_version);
    insert(&mut data, "aid", app_id);
    insert(&mut data, "aiid", app_installer_id);
    insert(&mut data, "cd", screen_name);
    Ok(data)
}

/// Apply the cross-cutting fields every built hit carries.
///
/// Encodes the kind (`ni=1` for non-interactive hits, `t=<code>` otherwise),
/// forces an exception's `tid` to the app tracking id (web tracking id when
/// unset), and merges the resolved client context and tracker-wide options.
pub fn enrich(config: &TrackerConfig, kind: EventKind, data: &mut HitData, client: &ClientContext) {
    if kind == EventKind::NonInteractive {
        insert(data, "ni", true);
    } else {
        insert(data, "t", kind.code());
    }

    if kind == EventKind::Exception {
        if let Some(tid) = config
            .app_tracking_id
            .as_deref()
            .or(config.web_tracking_id.as_deref())
        {
            insert(data, "tid", tid);
        }
    }

    if let Some(ip) = client.ip.as_deref() {
        insert(data, "uip", ip);
    }
    if let Some(ua) = client.user_agent.as_deref() {
        insert(data, "ua", ua);
    }
    insert(data, "geoid", config.geoid.as_str());
    insert(data, "ul", config.content_language.as_str());
    if client.uid != 0 {
        insert(data, "uid", client.uid as i64);
    }
}
