//! # hit-relay
//!
//! Validating, batching client for measurement-protocol telemetry collection
//! endpoints.
//!
//! This crate converts structured application events (page views, events,
//! transactions and their items, social interactions, exceptions, user
//! timings, screen views, session markers) into outbound hits against a
//! collection endpoint: a single-hit GET, or — with batching enabled — one
//! POST carrying a CRLF-delimited payload line per hit.
//!
//! The tracker is the validation, queuing, batching and flush engine. The
//! HTTP transport is a port: production code plugs in the reqwest adapter
//! (`reqwest-transport` feature) or any other [`Transport`] implementation,
//! tests plug in a mock.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use hit_relay::{RequestContext, Tracker, TrackerBuilder};
//! use hit_relay::{HitRequest, Transport, TransportError, TransportResponse};
//! use std::future::{ready, Future};
//!
//! // Any Transport implementation works; see the `reqwest-transport`
//! // feature for the production adapter.
//! struct NullTransport;
//!
//! impl Transport for NullTransport {
//!     fn execute(
//!         &self,
//!         _request: HitRequest,
//!     ) -> impl Future<Output = Result<TransportResponse, TransportError>> + Send {
//!         ready(Ok(TransportResponse { status: 200, body: String::new() }))
//!     }
//! }
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = TrackerBuilder::new()
//!     .with_web_tracking_id("UA-1234567-8")
//!     .with_batching(true)
//!     .build()?;
//! let mut tracker = Tracker::new(config, NullTransport);
//!
//! // Ambient request data is injected per call, never read from globals.
//! let ctx = RequestContext::new()
//!     .with_remote_addr("203.0.113.7")
//!     .with_user_agent("my-app/1.0");
//!
//! tracker
//!     .track_page_view(&ctx, "", "example.com", "/", "Home")
//!     .await?;
//! tracker.flush().await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Batching
//!
//! With batching disabled (the default) every tracked event flushes
//! immediately as a single-hit GET. With batching enabled, events accumulate
//! until the queue reaches `max_batch_hits` (default 20), then go out as one
//! POST with one payload line per hit. Debug mode always flushes
//! immediately. An explicit [`Tracker::flush`] drains whatever is pending.
//!
//! After a flush the queue is empty — success or failure. A transport error
//! drops the in-flight batch rather than retrying: the protocol has no
//! per-hit idempotency key, so a retry could double-count. Callers wanting
//! stronger delivery guarantees must layer them above this crate.
//!
//! ## Client context
//!
//! Each tracking call receives a [`RequestContext`] carrying the remote
//! address, headers, cookies and user agent of the request being tracked.
//! The resolved client IP honors a trusted-proxy chain: forwarding headers
//! (`X-Forwarded-For` and friends) are only believed when the directly
//! connecting peer is in the configured trusted-proxy set, so an untrusted
//! client cannot spoof its IP. The analytics UID is read from the `_ga`
//! cookie, falling back to the legacy `__utma`.
//!
//! ## Failure policy
//!
//! In production configuration, telemetry never breaks the host: malformed
//! events are dropped and logged (via `tracing`) with the offending
//! parameter name, and transport failures drop the batch and log. In debug
//! configuration, hits are routed to the collector's validation-echo
//! endpoint and every soft failure — validation, transport, or a hit the
//! remote validator rejected — is returned as an error so tests and staging
//! environments fail loudly.
//!
//! ## Features
//!
//! - `reqwest-transport`: production [`Transport`] adapter backed by
//!   `reqwest`.
//! - `test-helpers`: exposes `MockClock` and `MockTransport` to downstream
//!   integration tests.

// Domain layer - pure business logic
pub mod domain;

// Application layer - orchestration
pub mod application;

// Infrastructure layer - external adapters
pub mod infrastructure;

// Re-export commonly used types for convenience
pub use domain::event::{Event, EventKind, FieldValue, HitData};

pub use application::{
    builder::{ErrorInput, SessionEdge, ValidationError},
    context::{ClientContext, RequestContext},
    flusher::{FlushError, Flusher},
    metrics::{MetricsSnapshot, TrackerMetrics},
    ports::{Clock, HitMethod, HitRequest, Transport, TransportError, TransportResponse},
    queue::EventQueue,
    tracker::{BuildError, TrackError, Tracker, TrackerBuilder, TrackerConfig},
};

pub use infrastructure::clock::SystemClock;

#[cfg(feature = "reqwest-transport")]
pub use infrastructure::http::{ReqwestTransport, ReqwestTransportConfig};
