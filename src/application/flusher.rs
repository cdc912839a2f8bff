//! Queue draining and hit transmission.
//!
//! The flusher serializes one pending event as a single-hit GET or several as
//! a CRLF-joined batch POST, invokes the transport, and interprets the
//! outcome. In debug mode the collector echoes a validation verdict per hit;
//! any rejected hit is surfaced as a failure. Failures are logged here;
//! whether they escalate to the caller is the tracker's policy.

use crate::application::ports::{HitRequest, Transport, TransportError};
use crate::application::tracker::TrackerConfig;
use crate::domain::event::Event;
use crate::domain::payload;
use serde::Deserialize;
use tracing::{error, info, warn};

/// Failure of one flush. The whole in-flight batch is dropped either way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlushError {
    /// The request never produced an HTTP response.
    Transport(TransportError),
    /// The collector answered outside the 2xx range.
    Status(u16),
    /// Debug mode: the collector's validation echo rejected hits.
    HitsRejected {
        /// Number of hits the remote validator flagged invalid.
        invalid: usize,
    },
}

impl std::fmt::Display for FlushError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FlushError::Transport(e) => write!(f, "flush failed: {}", e),
            FlushError::Status(status) => write!(f, "collector answered HTTP {}", status),
            FlushError::HitsRejected { invalid } => {
                write!(f, "collector rejected {} hit(s)", invalid)
            }
        }
    }
}

impl std::error::Error for FlushError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FlushError::Transport(e) => Some(e),
            _ => None,
        }
    }
}

impl From<TransportError> for FlushError {
    fn from(e: TransportError) -> Self {
        FlushError::Transport(e)
    }
}

/// Validation echo returned by the collector's debug endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ValidationEcho {
    #[serde(default)]
    hit_parsing_result: Vec<HitParsingResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HitParsingResult {
    valid: bool,
    #[serde(default)]
    hit: String,
    #[serde(default)]
    parser_message: Vec<ParserMessage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ParserMessage {
    #[serde(default)]
    message_type: String,
    #[serde(default)]
    description: String,
}

/// Sends pending events to the collection endpoint.
pub struct Flusher<T: Transport> {
    transport: T,
}

impl<T: Transport> Flusher<T> {
    /// Wrap a transport adapter.
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Transmit the drained events. Returns the number of hits delivered.
    ///
    /// An empty drain is a no-op. One event becomes a GET with the payload in
    /// the query string; two or more become a POST with one payload line per
    /// event. The `z` cache buster is stamped with `now` (epoch seconds).
    pub async fn flush(
        &self,
        config: &TrackerConfig,
        events: &[Event],
        now: u64,
    ) -> Result<usize, FlushError> {
        let hit_count = events.len();
        if hit_count == 0 {
            return Ok(0);
        }

        let shared = payload::shared_body(
            config.api_version,
            config.web_tracking_id.as_deref(),
            config.anonymize_ip,
            now,
        );

        let request = if hit_count == 1 {
            let query =
                payload::single_hit_query(&shared, &events[0].data, &config.anonymous_client_id);
            HitRequest::get(format!("{}?{}", config.collect_url(), query))
        } else {
            let body = payload::batch_body(
                &shared,
                events.iter().map(|event| &event.data),
                &config.anonymous_client_id,
            );
            HitRequest::post(
                config.batch_url(),
                body,
                vec![
                    ("cache-control".to_string(), "no-cache".to_string()),
                    ("content-type".to_string(), "text/html".to_string()),
                ],
            )
        };

        if config.log_hits {
            info!(
                method = request.method.as_str(),
                url = %request.url,
                hits = hit_count,
                "sending telemetry"
            );
        }

        let response = match self.transport.execute(request).await {
            Ok(response) => response,
            Err(e) => {
                error!(error = %e, hits = hit_count, "telemetry transport failed, dropping batch");
                return Err(FlushError::Transport(e));
            }
        };

        if !response.is_success() {
            error!(
                status = response.status,
                hits = hit_count,
                "collector answered non-success status, dropping batch"
            );
            return Err(FlushError::Status(response.status));
        }

        if config.log_hits {
            info!(status = response.status, body = %response.body, "collector response");
        }

        if config.debug {
            self.check_validation_echo(&response.body)?;
        }

        Ok(hit_count)
    }

    /// Interpret the debug endpoint's per-hit validation verdicts.
    fn check_validation_echo(&self, body: &str) -> Result<(), FlushError> {
        let echo: ValidationEcho = match serde_json::from_str(body) {
            Ok(echo) => echo,
            Err(e) => {
                // The echo is advisory; an unparseable body is not a delivery
                // failure.
                warn!(error = %e, "could not parse validation echo");
                return Ok(());
            }
        };

        let mut invalid = 0;
        for result in &echo.hit_parsing_result {
            if result.valid {
                continue;
            }
            invalid += 1;
            for message in &result.parser_message {
                error!(
                    kind = %message.message_type,
                    hit = %result.hit,
                    "{}",
                    message.description
                );
            }
        }

        if invalid > 0 {
            return Err(FlushError::HitsRejected { invalid });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::tracker::TrackerBuilder;
    use crate::domain::event::{EventKind, FieldValue, HitData};
    use crate::infrastructure::mocks::MockTransport;

    fn config() -> TrackerConfig {
        TrackerBuilder::new()
            .with_web_tracking_id("UA-123456-1")
            .build()
            .expect("valid config")
    }

    fn event_with(pairs: &[(&str, &str)]) -> Event {
        let data: HitData = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), FieldValue::from(*v)))
            .collect();
        Event::new(EventKind::Event, data, 1_700_000_000)
    }

    #[tokio::test]
    async fn test_flush_empty_is_noop() {
        let transport = MockTransport::ok();
        let flusher = Flusher::new(transport.clone());
        let delivered = flusher.flush(&config(), &[], 1).await.unwrap();
        assert_eq!(delivered, 0);
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_single_event_goes_out_as_get() {
        let transport = MockTransport::ok();
        let flusher = Flusher::new(transport.clone());
        let events = vec![event_with(&[("ec", "ui"), ("ea", "click")])];

        let delivered = flusher.flush(&config(), &events, 99).await.unwrap();
        assert_eq!(delivered, 1);

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(request.method.as_str(), "GET");
        assert!(request.url.starts_with("https://www.google-analytics.com/collect?"));
        assert!(request.url.contains("ec=ui"));
        assert!(request.url.contains("z=99"));
        assert!(request.body.is_none());
    }

    #[tokio::test]
    async fn test_batch_goes_out_as_post_with_headers() {
        let transport = MockTransport::ok();
        let flusher = Flusher::new(transport.clone());
        let events = vec![
            event_with(&[("ec", "ui")]),
            event_with(&[("ec", "api")]),
            event_with(&[("ec", "job")]),
        ];

        let delivered = flusher.flush(&config(), &events, 99).await.unwrap();
        assert_eq!(delivered, 3);

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(request.method.as_str(), "POST");
        assert_eq!(request.url, "https://www.google-analytics.com/batch");
        let body = request.body.as_deref().unwrap();
        assert_eq!(body.split("\r\n").count(), 3);
        assert!(request
            .headers
            .contains(&("cache-control".to_string(), "no-cache".to_string())));
        assert!(request
            .headers
            .contains(&("content-type".to_string(), "text/html".to_string())));
    }

    #[tokio::test]
    async fn test_non_success_status_is_an_error() {
        let transport = MockTransport::status(500);
        let flusher = Flusher::new(transport);
        let events = vec![event_with(&[("ec", "ui")])];
        let err = flusher.flush(&config(), &events, 1).await.unwrap_err();
        assert_eq!(err, FlushError::Status(500));
    }

    #[tokio::test]
    async fn test_transport_failure_propagates() {
        let transport = MockTransport::failing(TransportError::Timeout);
        let flusher = Flusher::new(transport);
        let events = vec![event_with(&[("ec", "ui")])];
        let err = flusher.flush(&config(), &events, 1).await.unwrap_err();
        assert_eq!(err, FlushError::Transport(TransportError::Timeout));
    }

    #[tokio::test]
    async fn test_debug_echo_rejection_detected() {
        let echo = r#"{
            "hitParsingResult": [
                {"valid": true, "hit": "/collect?v=1", "parserMessage": []},
                {"valid": false, "hit": "/collect?v=1", "parserMessage": [
                    {"messageType": "ERROR", "description": "Missing tracking id."}
                ]}
            ]
        }"#;
        let transport = MockTransport::responding(200, echo);
        let flusher = Flusher::new(transport);

        let mut config = config();
        config.debug = true;
        let events = vec![event_with(&[("ec", "ui")]), event_with(&[("ec", "api")])];
        let err = flusher.flush(&config, &events, 1).await.unwrap_err();
        assert_eq!(err, FlushError::HitsRejected { invalid: 1 });
    }

    #[tokio::test]
    async fn test_debug_echo_all_valid_passes() {
        let echo = r#"{"hitParsingResult": [{"valid": true, "hit": "", "parserMessage": []}]}"#;
        let transport = MockTransport::responding(200, echo);
        let flusher = Flusher::new(transport);

        let mut config = config();
        config.debug = true;
        let events = vec![event_with(&[("ec", "ui")])];
        assert_eq!(flusher.flush(&config, &events, 1).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_debug_unparseable_echo_is_tolerated() {
        let transport = MockTransport::responding(200, "not json");
        let flusher = Flusher::new(transport);

        let mut config = config();
        config.debug = true;
        let events = vec![event_with(&[("ec", "ui")])];
        assert_eq!(flusher.flush(&config, &events, 1).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_debug_mode_targets_debug_path() {
        let transport = MockTransport::ok();
        let flusher = Flusher::new(transport.clone());

        let mut config = config();
        config.debug = true;
        let events = vec![event_with(&[("ec", "ui")])];
        let _ = flusher.flush(&config, &events, 1).await;

        let requests = transport.requests();
        assert!(requests[0]
            .url
            .starts_with("https://www.google-analytics.com/debug/collect?"));
    }
}
