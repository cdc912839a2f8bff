//! Tracker orchestration.
//!
//! The [`Tracker`] owns the configuration, the pending-event queue and the
//! flusher, and exposes the public tracking surface. Every tracking call
//! resolves the injected request context, shapes and validates the event,
//! enqueues it, and flushes when the threshold is reached. In production
//! configuration per-event failures are logged and swallowed so telemetry
//! never breaks the host; in debug configuration they are returned.

use crate::application::builder::{self, ErrorInput, SessionEdge, ValidationError};
use crate::application::context::{self, RequestContext};
use crate::application::flusher::{FlushError, Flusher};
use crate::application::metrics::TrackerMetrics;
use crate::application::ports::{Clock, Transport};
use crate::application::queue::EventQueue;
use crate::domain::event::{Event, EventKind, HitData};
use crate::domain::validation::{validate_metrics, validate_props, validate_tracking_id};
use crate::infrastructure::clock::SystemClock;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{info, warn};

/// Error returned when tracker configuration validation fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// The web tracking id does not match `UA-XXXX-Y`.
    InvalidWebTrackingId(String),
    /// The app tracking id does not match `UA-XXXX-Y`.
    InvalidAppTrackingId(String),
    /// The collector host is empty.
    EmptyHost,
}

impl std::fmt::Display for BuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildError::InvalidWebTrackingId(id) => {
                write!(f, "web tracking id `{}` is not a valid property id", id)
            }
            BuildError::InvalidAppTrackingId(id) => {
                write!(f, "app tracking id `{}` is not a valid property id", id)
            }
            BuildError::EmptyHost => write!(f, "collector host must not be empty"),
        }
    }
}

impl std::error::Error for BuildError {}

/// Error surfaced by a tracking call.
///
/// Only returned in debug configuration (and never for a disabled tracker);
/// production configuration logs and swallows so the host's control flow is
/// untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackError {
    /// Tracking attempted while the enabled flag is off.
    NotEnabled,
    /// The event failed shape validation and was dropped.
    Validation(ValidationError),
    /// The flush triggered by this call failed.
    Flush(FlushError),
}

impl std::fmt::Display for TrackError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrackError::NotEnabled => write!(f, "tracker is not enabled"),
            TrackError::Validation(e) => write!(f, "event rejected: {}", e),
            TrackError::Flush(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for TrackError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TrackError::Validation(e) => Some(e),
            TrackError::Flush(e) => Some(e),
            TrackError::NotEnabled => None,
        }
    }
}

impl From<ValidationError> for TrackError {
    fn from(e: ValidationError) -> Self {
        TrackError::Validation(e)
    }
}

impl From<FlushError> for TrackError {
    fn from(e: FlushError) -> Self {
        TrackError::Flush(e)
    }
}

/// Tracker-wide options, immutable after construction.
///
/// Built through [`TrackerBuilder`], which validates the tracking-id formats.
/// The quota fields (`max_batch_payload_kb` onward) and `user_traits` are
/// carried for the embedding application's bookkeeping and are not enforced
/// by this core.
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Display name of the reporting application.
    pub application_name: String,
    /// Send hits over https.
    pub ssl: bool,
    /// Collector host.
    pub host: String,
    /// Path of the single-hit endpoint.
    pub hit_path: String,
    /// Path of the batch endpoint.
    pub batch_path: String,
    /// Measurement protocol version.
    pub api_version: u32,
    /// Fallback client id used when a hit's `cid` is absent or not a GUID.
    pub anonymous_client_id: String,
    /// App property id; forced onto exception hits.
    pub app_tracking_id: Option<String>,
    /// Web property id; the tracker-wide default `tid`.
    pub web_tracking_id: Option<String>,
    /// Accumulate hits and send them as batches.
    pub batching: bool,
    /// Queue length that triggers a batch flush.
    pub max_batch_hits: usize,
    /// Advisory batch payload ceiling, kilobytes.
    pub max_batch_payload_kb: usize,
    /// Advisory single-hit payload ceiling, kilobytes.
    pub max_hit_payload_kb: usize,
    /// Advisory daily hit quota.
    pub max_hits_per_day: u64,
    /// Advisory monthly hit quota.
    pub max_hits_per_month: u64,
    /// Advisory per-session hit quota.
    pub max_hits_per_session: u64,
    /// Enabled user-trait names (carried, unused by this core).
    pub user_traits: Vec<String>,
    /// Geographical id reported with every hit.
    pub geoid: String,
    /// Content language reported with every hit (`ul`).
    pub content_language: String,
    /// Ask the collector to anonymize the sender IP.
    pub anonymize_ip: bool,
    /// Master switch; when off, tracking calls drop their events.
    pub enabled: bool,
    /// Route hits to the validation-echo endpoint and escalate soft
    /// failures. Debug hits do not show up in reports.
    pub debug: bool,
    /// Log every hit before sending and every collector response.
    pub log_hits: bool,
    /// Peers allowed to supply client-IP forwarding headers.
    pub trusted_proxies: BTreeSet<String>,
}

impl TrackerConfig {
    /// Scheme + host, with the debug prefix when configured.
    pub fn base_url(&self) -> String {
        let scheme = if self.ssl { "https" } else { "http" };
        let debug = if self.debug { "/debug" } else { "" };
        format!("{}://{}{}", scheme, self.host, debug)
    }

    /// Full single-hit endpoint URL, without query string.
    pub fn collect_url(&self) -> String {
        format!("{}{}", self.base_url(), self.hit_path)
    }

    /// Full batch endpoint URL.
    pub fn batch_url(&self) -> String {
        format!("{}{}", self.base_url(), self.batch_path)
    }
}

/// Builder for [`TrackerConfig`].
///
/// Defaults match the classic collector: https against
/// `www.google-analytics.com`, `/collect` and `/batch` paths, protocol
/// version 1, anonymous client id `"555"`, 20-hit batches, anonymized IPs,
/// enabled, with batching, debug and hit logging off.
#[derive(Debug, Clone)]
pub struct TrackerBuilder {
    config: TrackerConfig,
}

impl Default for TrackerBuilder {
    fn default() -> Self {
        Self {
            config: TrackerConfig {
                application_name: "my-application".to_string(),
                ssl: true,
                host: "www.google-analytics.com".to_string(),
                hit_path: "/collect".to_string(),
                batch_path: "/batch".to_string(),
                api_version: 1,
                anonymous_client_id: "555".to_string(),
                app_tracking_id: None,
                web_tracking_id: None,
                batching: false,
                max_batch_hits: 20,
                max_batch_payload_kb: 16,
                max_hit_payload_kb: 8,
                max_hits_per_day: 200_000,
                max_hits_per_month: 10_000_000,
                max_hits_per_session: 500,
                user_traits: Vec::new(),
                geoid: "MZ".to_string(),
                content_language: "pt".to_string(),
                anonymize_ip: true,
                enabled: true,
                debug: false,
                log_hits: false,
                trusted_proxies: BTreeSet::new(),
            },
        }
    }
}

impl TrackerBuilder {
    /// Start from the defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the reporting application name.
    pub fn with_application_name(mut self, name: impl Into<String>) -> Self {
        self.config.application_name = name.into();
        self
    }

    /// Toggle https.
    pub fn with_ssl(mut self, ssl: bool) -> Self {
        self.config.ssl = ssl;
        self
    }

    /// Set the collector host.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    /// Set the single-hit endpoint path.
    pub fn with_hit_path(mut self, path: impl Into<String>) -> Self {
        self.config.hit_path = path.into();
        self
    }

    /// Set the batch endpoint path.
    pub fn with_batch_path(mut self, path: impl Into<String>) -> Self {
        self.config.batch_path = path.into();
        self
    }

    /// Set the anonymous fallback client id.
    pub fn with_anonymous_client_id(mut self, cid: impl Into<String>) -> Self {
        self.config.anonymous_client_id = cid.into();
        self
    }

    /// Set the app property id. Validated by `build()`.
    pub fn with_app_tracking_id(mut self, id: impl Into<String>) -> Self {
        self.config.app_tracking_id = Some(id.into());
        self
    }

    /// Set the web property id. Validated by `build()`.
    pub fn with_web_tracking_id(mut self, id: impl Into<String>) -> Self {
        self.config.web_tracking_id = Some(id.into());
        self
    }

    /// Enable or disable batching.
    pub fn with_batching(mut self, batching: bool) -> Self {
        self.config.batching = batching;
        self
    }

    /// Set the queue length that triggers a batch flush.
    pub fn with_max_batch_hits(mut self, max: usize) -> Self {
        self.config.max_batch_hits = max;
        self
    }

    /// Set the geographical id reported with every hit.
    pub fn with_geoid(mut self, geoid: impl Into<String>) -> Self {
        self.config.geoid = geoid.into();
        self
    }

    /// Set the content language reported with every hit.
    pub fn with_content_language(mut self, language: impl Into<String>) -> Self {
        self.config.content_language = language.into();
        self
    }

    /// Toggle collector-side IP anonymization.
    pub fn with_anonymize_ip(mut self, anonymize: bool) -> Self {
        self.config.anonymize_ip = anonymize;
        self
    }

    /// Master switch for the tracker.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.config.enabled = enabled;
        self
    }

    /// Route hits to the validation-echo endpoint and escalate failures.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.config.debug = debug;
        self
    }

    /// Log every hit and collector response.
    pub fn with_log_hits(mut self, log_hits: bool) -> Self {
        self.config.log_hits = log_hits;
        self
    }

    /// Add a trusted proxy allowed to supply forwarding headers.
    pub fn with_trusted_proxy(mut self, proxy: impl Into<String>) -> Self {
        self.config.trusted_proxies.insert(proxy.into());
        self
    }

    /// Replace the whole trusted-proxy set.
    pub fn with_trusted_proxies<I, S>(mut self, proxies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.trusted_proxies = proxies.into_iter().map(Into::into).collect();
        self
    }

    /// Validate and produce the immutable configuration.
    ///
    /// # Errors
    /// Returns a [`BuildError`] when a tracking id fails format validation or
    /// the host is empty.
    pub fn build(self) -> Result<TrackerConfig, BuildError> {
        if self.config.host.is_empty() {
            return Err(BuildError::EmptyHost);
        }
        if let Some(id) = &self.config.web_tracking_id {
            if !validate_tracking_id(id) {
                return Err(BuildError::InvalidWebTrackingId(id.clone()));
            }
        }
        if let Some(id) = &self.config.app_tracking_id {
            if !validate_tracking_id(id) {
                return Err(BuildError::InvalidAppTrackingId(id.clone()));
            }
        }
        Ok(self.config)
    }
}

/// Telemetry tracker: validates, queues, batches and flushes hits.
///
/// Generic over the [`Transport`] port; production code uses the reqwest
/// adapter, tests a mock. Single logical owner: tracking and flushing take
/// `&mut self`, so embedding in a multi-threaded host requires external
/// serialization (a mutex, or confinement to one worker).
pub struct Tracker<T: Transport> {
    config: TrackerConfig,
    queue: EventQueue,
    flusher: Flusher<T>,
    clock: Arc<dyn Clock>,
    metrics: TrackerMetrics,
}

impl<T: Transport> Tracker<T> {
    /// Create a tracker using the system clock.
    pub fn new(config: TrackerConfig, transport: T) -> Self {
        Self::with_clock(config, transport, Arc::new(SystemClock::new()))
    }

    /// Create a tracker with an explicit clock (mainly for testing).
    pub fn with_clock(config: TrackerConfig, transport: T, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            queue: EventQueue::new(),
            flusher: Flusher::new(transport),
            clock,
            metrics: TrackerMetrics::new(),
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Handle to the tracker's activity counters.
    pub fn metrics(&self) -> TrackerMetrics {
        self.metrics.clone()
    }

    /// Number of events currently queued.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Send all queued telemetry now.
    pub async fn flush(&mut self) -> Result<(), TrackError> {
        match self.flush_pending().await {
            Ok(()) => Ok(()),
            Err(e) if self.config.debug => Err(TrackError::Flush(e)),
            // Already logged by the flusher; production swallows.
            Err(_) => Ok(()),
        }
    }

    /// Mark the start of a session for a client id.
    pub async fn start_session(
        &mut self,
        ctx: &RequestContext,
        cid: &str,
    ) -> Result<(), TrackError> {
        let data = builder::session_marker(cid, SessionEdge::Start);
        self.track(ctx, EventKind::NonInteractive, data).await
    }

    /// Mark the end of a session for a client id.
    pub async fn end_session(&mut self, ctx: &RequestContext, cid: &str) -> Result<(), TrackError> {
        let data = builder::session_marker(cid, SessionEdge::End);
        self.track(ctx, EventKind::NonInteractive, data).await
    }

    /// Track a page view.
    pub async fn track_page_view(
        &mut self,
        ctx: &RequestContext,
        cid: &str,
        hostname: &str,
        page: &str,
        title: &str,
    ) -> Result<(), TrackError> {
        match builder::page_view(cid, hostname, page, title) {
            Ok(data) => self.track(ctx, EventKind::PageView, data).await,
            Err(e) => self.reject("track_page_view", e),
        }
    }

    /// Track a category/action event.
    pub async fn track_event(
        &mut self,
        ctx: &RequestContext,
        cid: &str,
        category: &str,
        action: &str,
        label: Option<&str>,
        value: Option<i64>,
    ) -> Result<(), TrackError> {
        match builder::event(cid, category, action, label, value) {
            Ok(data) => self.track(ctx, EventKind::Event, data).await,
            Err(e) => self.reject("track_event", e),
        }
    }

    /// Track an e-commerce transaction.
    #[allow(clippy::too_many_arguments)]
    pub async fn track_transaction(
        &mut self,
        ctx: &RequestContext,
        cid: &str,
        txn_id: &str,
        affiliation: Option<&str>,
        revenue: Option<f64>,
        shipping: Option<f64>,
        tax: Option<f64>,
        currency: Option<&str>,
    ) -> Result<(), TrackError> {
        match builder::transaction(cid, txn_id, affiliation, revenue, shipping, tax, currency) {
            Ok(data) => self.track(ctx, EventKind::Transaction, data).await,
            Err(e) => self.reject("track_transaction", e),
        }
    }

    /// Track one line item of a transaction.
    #[allow(clippy::too_many_arguments)]
    pub async fn track_transaction_item(
        &mut self,
        ctx: &RequestContext,
        cid: &str,
        txn_id: &str,
        name: &str,
        price: Option<f64>,
        quantity: Option<i64>,
        sku: Option<&str>,
        variation: Option<&str>,
        currency: Option<&str>,
    ) -> Result<(), TrackError> {
        match builder::transaction_item(cid, txn_id, name, price, quantity, sku, variation, currency)
        {
            Ok(data) => self.track(ctx, EventKind::Item, data).await,
            Err(e) => self.reject("track_transaction_item", e),
        }
    }

    /// Track a social interaction.
    pub async fn track_social(
        &mut self,
        ctx: &RequestContext,
        cid: &str,
        action: &str,
        network: &str,
        target: &str,
    ) -> Result<(), TrackError> {
        match builder::social(cid, action, network, target) {
            Ok(data) => self.track(ctx, EventKind::Social, data).await,
            Err(e) => self.reject("track_social", e),
        }
    }

    /// Track an application exception.
    ///
    /// The hit's tracking id is forced to the app property (web property when
    /// no app property is configured).
    pub async fn track_exception(
        &mut self,
        ctx: &RequestContext,
        cid: &str,
        error: ErrorInput,
        is_fatal: bool,
    ) -> Result<(), TrackError> {
        let data = builder::exception(cid, &error, is_fatal);
        self.track(ctx, EventKind::Exception, data).await
    }

    /// Track a user timing measurement.
    #[allow(clippy::too_many_arguments)]
    pub async fn track_user_timing(
        &mut self,
        ctx: &RequestContext,
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
    ) -> Result<(), TrackError> {
        match builder::user_timing(
            cid,
            category,
            variable,
            time,
            label,
            dns_load_time,
            page_download_time,
            redirect_response_time,
            tcp_connect_time,
            server_response_time,
        ) {
            Ok(data) => self.track(ctx, EventKind::Timing, data).await,
            Err(e) => self.reject("track_user_timing", e),
        }
    }

    /// Track an app screen view.
    #[allow(clippy::too_many_arguments)]
    pub async fn track_screen_view(
        &mut self,
        ctx: &RequestContext,
        cid: &str,
        app_name: &str,
        app_version: &str,
        app_id: &str,
        app_installer_id: &str,
        screen_name: &str,
    ) -> Result<(), TrackError> {
        match builder::screen_view(cid, app_name, app_version, app_id, app_installer_id, screen_name)
        {
            Ok(data) => self.track(ctx, EventKind::ScreenView, data).await,
            Err(e) => self.reject("track_screen_view", e),
        }
    }

    /// Shape-checked entry point shared by every wrapper: gate, validate,
    /// enrich, enqueue, and flush when due.
    async fn track(
        &mut self,
        ctx: &RequestContext,
        kind: EventKind,
        data: HitData,
    ) -> Result<(), TrackError> {
        self.track_full(ctx, kind, data, HitData::new(), HitData::new())
            .await
    }

    async fn track_full(
        &mut self,
        ctx: &RequestContext,
        kind: EventKind,
        mut data: HitData,
        props: HitData,
        metrics: HitData,
    ) -> Result<(), TrackError> {
        if !self.config.enabled {
            // Disabling telemetry must never break the host, so this is
            // swallowed even in debug configuration.
            let err = TrackError::NotEnabled;
            warn!(kind = %kind, error = %err, "event dropped");
            self.metrics.record_dropped();
            return Ok(());
        }

        if !validate_props(&props) {
            return self.reject_kind(kind, ValidationError::InvalidProps);
        }
        if !validate_metrics(&metrics) {
            return self.reject_kind(kind, ValidationError::InvalidMetrics);
        }

        let client = context::resolve(ctx, &self.config.trusted_proxies, &[]);
        builder::enrich(&self.config, kind, &mut data, &client);

        if self.config.log_hits {
            info!(kind = %kind, data = ?data, "queueing hit");
        }

        let mut event = Event::new(kind, data, self.clock.now());
        event.props = props;
        event.metrics = metrics;
        self.queue.push(event);
        self.metrics.record_queued();

        if self
            .queue
            .should_flush(self.config.debug, self.config.batching, self.config.max_batch_hits)
        {
            return self.flush().await;
        }
        Ok(())
    }

    async fn flush_pending(&mut self) -> Result<(), FlushError> {
        let events = self.queue.drain();
        if events.is_empty() {
            return Ok(());
        }
        let now = self.clock.now();
        match self.flusher.flush(&self.config, &events, now).await {
            Ok(hits) => {
                self.metrics.record_delivered(hits as u64);
                Ok(())
            }
            Err(e) => {
                self.metrics.record_flush_failure();
                Err(e)
            }
        }
    }

    /// Drop a malformed event: count it, log the offending parameter, and
    /// escalate only in debug configuration.
    fn reject(&self, operation: &'static str, error: ValidationError) -> Result<(), TrackError> {
        self.metrics.record_dropped();
        warn!(operation, error = %error, "event dropped");
        if self.config.debug {
            Err(TrackError::Validation(error))
        } else {
            Ok(())
        }
    }

    fn reject_kind(&self, kind: EventKind, error: ValidationError) -> Result<(), TrackError> {
        self.metrics.record_dropped();
        warn!(kind = %kind, error = %error, "event dropped");
        if self.config.debug {
            Err(TrackError::Validation(error))
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::event::FieldValue;
    use crate::infrastructure::mocks::{MockClock, MockTransport};

    fn tracker(configure: impl FnOnce(TrackerBuilder) -> TrackerBuilder) -> Tracker<MockTransport> {
        let config = configure(TrackerBuilder::new().with_web_tracking_id("UA-1234567-8"))
            .build()
            .expect("valid config");
        Tracker::with_clock(
            config,
            MockTransport::ok(),
            Arc::new(MockClock::new(1_700_000_000)),
        )
    }

    #[test]
    fn test_build_rejects_malformed_tracking_ids() {
        let err = TrackerBuilder::new()
            .with_web_tracking_id("ua-123456-1")
            .build()
            .unwrap_err();
        assert_eq!(err, BuildError::InvalidWebTrackingId("ua-123456-1".to_string()));

        let err = TrackerBuilder::new()
            .with_app_tracking_id("UA-12-1")
            .build()
            .unwrap_err();
        assert_eq!(err, BuildError::InvalidAppTrackingId("UA-12-1".to_string()));

        let err = TrackerBuilder::new().with_host("").build().unwrap_err();
        assert_eq!(err, BuildError::EmptyHost);
    }

    #[test]
    fn test_config_urls() {
        let config = TrackerBuilder::new().build().unwrap();
        assert_eq!(config.collect_url(), "https://www.google-analytics.com/collect");
        assert_eq!(config.batch_url(), "https://www.google-analytics.com/batch");

        let config = TrackerBuilder::new()
            .with_ssl(false)
            .with_debug(true)
            .with_host("collector.test")
            .build()
            .unwrap();
        assert_eq!(config.collect_url(), "http://collector.test/debug/collect");
    }

    #[tokio::test]
    async fn test_disabled_tracker_drops_silently() {
        let mut tracker = tracker(|b| b.with_enabled(false).with_debug(true));
        let ctx = RequestContext::new();
        let result = tracker
            .track_page_view(&ctx, "", "example.com", "/", "home")
            .await;
        assert!(result.is_ok());
        assert_eq!(tracker.pending(), 0);
        assert_eq!(tracker.metrics().events_dropped(), 1);
    }

    #[tokio::test]
    async fn test_validation_failure_is_swallowed_in_production() {
        let mut tracker = tracker(|b| b);
        let ctx = RequestContext::new();
        let result = tracker.track_page_view(&ctx, "", "", "/", "home").await;
        assert!(result.is_ok());
        assert_eq!(tracker.pending(), 0);
        assert_eq!(tracker.metrics().events_dropped(), 1);
    }

    #[tokio::test]
    async fn test_validation_failure_escalates_in_debug() {
        let mut tracker = tracker(|b| b.with_debug(true));
        let ctx = RequestContext::new();
        let result = tracker.track_page_view(&ctx, "", "", "/", "home").await;
        assert_eq!(
            result,
            Err(TrackError::Validation(ValidationError::InvalidParam("hostname")))
        );
    }

    #[tokio::test]
    async fn test_malformed_props_reject_the_event() {
        let mut tracker = tracker(|b| b.with_debug(true));
        let ctx = RequestContext::new();
        let mut props = HitData::new();
        props.insert("seats".to_string(), FieldValue::Int(5));

        let data = builder::event("cid", "ui", "click", None, None).unwrap();
        let result = tracker
            .track_full(&ctx, EventKind::Event, data, props, HitData::new())
            .await;
        assert_eq!(result, Err(TrackError::Validation(ValidationError::InvalidProps)));
        assert_eq!(tracker.pending(), 0);
    }

    #[tokio::test]
    async fn test_malformed_metrics_reject_the_event() {
        let mut tracker = tracker(|b| b.with_debug(true));
        let ctx = RequestContext::new();
        let mut metrics = HitData::new();
        metrics.insert("latency".to_string(), FieldValue::from("fast"));

        let data = builder::event("cid", "ui", "click", None, None).unwrap();
        let result = tracker
            .track_full(&ctx, EventKind::Event, data, HitData::new(), metrics)
            .await;
        assert_eq!(result, Err(TrackError::Validation(ValidationError::InvalidMetrics)));
    }

    #[tokio::test]
    async fn test_event_timestamp_comes_from_clock() {
        let clock = Arc::new(MockClock::new(1_234_567));
        let config = TrackerBuilder::new()
            .with_batching(true)
            .build()
            .expect("valid config");
        let mut tracker = Tracker::with_clock(config, MockTransport::ok(), clock.clone());
        let ctx = RequestContext::new();
        tracker
            .track_event(&ctx, "cid", "ui", "click", None, None)
            .await
            .unwrap();
        assert_eq!(tracker.pending(), 1);
        // Flush stamps z with the (advanced) clock.
        clock.advance(10);
        tracker.flush().await.unwrap();
        assert_eq!(tracker.pending(), 0);
    }
}
