//! Queue threshold and batch payload behavior.

use hit_relay::infrastructure::mocks::{MockClock, MockTransport};
use hit_relay::{HitMethod, RequestContext, Tracker, TrackerBuilder, TransportError};
use std::collections::HashMap;
use std::sync::Arc;

fn line_params(line: &str) -> HashMap<String, String> {
    form_urlencoded::parse(line.as_bytes()).into_owned().collect()
}

fn batching_tracker(transport: MockTransport, max_batch_hits: usize) -> Tracker<MockTransport> {
    let config = TrackerBuilder::new()
        .with_web_tracking_id("UA-1234567-8")
        .with_batching(true)
        .with_max_batch_hits(max_batch_hits)
        .build()
        .expect("valid config");
    Tracker::with_clock(config, transport, Arc::new(MockClock::new(1_700_000_000)))
}

async fn track_n(tracker: &mut Tracker<MockTransport>, n: usize) {
    let ctx = RequestContext::new();
    for i in 0..n {
        tracker
            .track_event(&ctx, "", "batch", &format!("action-{i}"), None, None)
            .await
            .expect("tracked");
    }
}

#[tokio::test]
async fn queue_accumulates_below_the_threshold() {
    let transport = MockTransport::ok();
    let mut tracker = batching_tracker(transport.clone(), 5);

    track_n(&mut tracker, 4).await;

    assert_eq!(tracker.pending(), 4);
    assert_eq!(transport.request_count(), 0);
}

#[tokio::test]
async fn reaching_the_threshold_flushes_as_one_post() {
    let transport = MockTransport::ok();
    let mut tracker = batching_tracker(transport.clone(), 5);

    track_n(&mut tracker, 5).await;

    assert_eq!(tracker.pending(), 0);
    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, HitMethod::Post);
    assert!(requests[0].url.ends_with("/batch"));

    let body = requests[0].body.as_deref().expect("post body");
    let lines: Vec<&str> = body.split("\r\n").collect();
    assert_eq!(lines.len(), 5);
    assert!(!body.ends_with("\r\n"));

    for (i, line) in lines.iter().enumerate() {
        let params = line_params(line);
        assert_eq!(params.get("ea").map(String::as_str), Some(format!("action-{i}").as_str()));
        assert_eq!(params.get("v").map(String::as_str), Some("1"));
        assert_eq!(params.get("tid").map(String::as_str), Some("UA-1234567-8"));
        assert_eq!(params.get("cid").map(String::as_str), Some("555"));
        assert_eq!(params.get("z").map(String::as_str), Some("1700000000"));
    }
}

#[tokio::test]
async fn explicit_flush_of_a_single_event_uses_get() {
    let transport = MockTransport::ok();
    let mut tracker = batching_tracker(transport.clone(), 20);

    track_n(&mut tracker, 1).await;
    assert_eq!(transport.request_count(), 0);

    tracker.flush().await.expect("flushed");

    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, HitMethod::Get);
    assert!(requests[0].body.is_none());
}

#[tokio::test]
async fn explicit_flush_of_two_events_uses_post() {
    let transport = MockTransport::ok();
    let mut tracker = batching_tracker(transport.clone(), 20);

    track_n(&mut tracker, 2).await;
    tracker.flush().await.expect("flushed");

    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, HitMethod::Post);
    let body = requests[0].body.as_deref().expect("post body");
    assert_eq!(body.split("\r\n").count(), 2);
}

#[tokio::test]
async fn flush_on_empty_queue_is_a_noop() {
    let transport = MockTransport::ok();
    let mut tracker = batching_tracker(transport.clone(), 20);

    tracker.flush().await.expect("nothing to do");
    assert_eq!(transport.request_count(), 0);
}

#[tokio::test]
async fn batching_disabled_flushes_every_event() {
    let transport = MockTransport::ok();
    let config = TrackerBuilder::new()
        .with_web_tracking_id("UA-1234567-8")
        .with_batching(false)
        .build()
        .expect("valid config");
    let mut tracker =
        Tracker::with_clock(config, transport.clone(), Arc::new(MockClock::new(1)));

    track_n(&mut tracker, 3).await;

    assert_eq!(tracker.pending(), 0);
    assert_eq!(transport.request_count(), 3);
    for request in transport.requests() {
        assert_eq!(request.method, HitMethod::Get);
    }
}

#[tokio::test]
async fn debug_mode_flushes_immediately_even_with_batching() {
    let transport = MockTransport::responding(200, r#"{"hitParsingResult": []}"#);
    let config = TrackerBuilder::new()
        .with_web_tracking_id("UA-1234567-8")
        .with_batching(true)
        .with_max_batch_hits(20)
        .with_debug(true)
        .build()
        .expect("valid config");
    let mut tracker =
        Tracker::with_clock(config, transport.clone(), Arc::new(MockClock::new(1)));

    track_n(&mut tracker, 2).await;

    assert_eq!(tracker.pending(), 0);
    assert_eq!(transport.request_count(), 2);
}

#[tokio::test]
async fn failed_batch_is_dropped_not_retried() {
    let transport = MockTransport::failing(TransportError::Connect("refused".to_string()));
    let mut tracker = batching_tracker(transport.clone(), 20);

    track_n(&mut tracker, 3).await;
    tracker.flush().await.expect("failure swallowed in production");

    assert_eq!(tracker.pending(), 0);
    assert_eq!(transport.request_count(), 1);

    // Nothing left to retry: a second flush does not touch the transport.
    tracker.flush().await.expect("nothing to do");
    assert_eq!(transport.request_count(), 1);
    assert_eq!(tracker.metrics().flush_failures(), 1);
}

#[tokio::test]
async fn batched_exception_keeps_its_tracking_id_override() {
    let transport = MockTransport::ok();
    let config = TrackerBuilder::new()
        .with_web_tracking_id("UA-1234567-8")
        .with_app_tracking_id("UA-7654321-1")
        .with_batching(true)
        .with_max_batch_hits(20)
        .build()
        .expect("valid config");
    let mut tracker =
        Tracker::with_clock(config, transport.clone(), Arc::new(MockClock::new(1)));

    let ctx = RequestContext::new();
    tracker
        .track_event(&ctx, "", "ui", "click", None, None)
        .await
        .expect("tracked");
    tracker
        .track_exception(&ctx, "", hit_relay::ErrorInput::from("boom"), true)
        .await
        .expect("tracked");
    tracker.flush().await.expect("flushed");

    let requests = transport.requests();
    let body = requests[0].body.as_deref().expect("post body");
    let lines: Vec<&str> = body.split("\r\n").collect();
    assert_eq!(lines.len(), 2);

    let event_line = line_params(lines[0]);
    assert_eq!(event_line.get("tid").map(String::as_str), Some("UA-1234567-8"));

    let exception_line = line_params(lines[1]);
    assert_eq!(exception_line.get("tid").map(String::as_str), Some("UA-7654321-1"));
    assert_eq!(exception_line.get("exd").map(String::as_str), Some("boom"));
}

#[tokio::test]
async fn non_success_status_drops_the_batch() {
    let transport = MockTransport::status(503);
    let mut tracker = batching_tracker(transport.clone(), 20);

    track_n(&mut tracker, 2).await;
    tracker.flush().await.expect("failure swallowed in production");

    assert_eq!(tracker.pending(), 0);
    assert_eq!(tracker.metrics().flush_failures(), 1);
    assert_eq!(tracker.metrics().hits_delivered(), 0);
}
