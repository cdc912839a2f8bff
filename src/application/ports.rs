//! Ports (interfaces) for the application layer.
//!
//! In hexagonal architecture, ports define the interfaces that the application
//! layer needs. Infrastructure adapters implement these ports.

use std::fmt::Debug;
use std::future::Future;

/// HTTP verb of one collection request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitMethod {
    /// Single hit, payload in the query string.
    Get,
    /// Batch, payload in the body.
    Post,
}

impl HitMethod {
    /// Verb name as sent on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            HitMethod::Get => "GET",
            HitMethod::Post => "POST",
        }
    }
}

/// One outbound request handed to the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HitRequest {
    /// Verb to use.
    pub method: HitMethod,
    /// Full target URL. For GET requests the payload is already part of the
    /// query string.
    pub url: String,
    /// POST body, absent for GET.
    pub body: Option<String>,
    /// Extra request headers.
    pub headers: Vec<(String, String)>,
}

impl HitRequest {
    /// Single-hit GET request with the payload in `url`.
    pub fn get(url: String) -> Self {
        Self {
            method: HitMethod::Get,
            url,
            body: None,
            headers: Vec::new(),
        }
    }

    /// Batch POST request.
    pub fn post(url: String, body: String, headers: Vec<(String, String)>) -> Self {
        Self {
            method: HitMethod::Post,
            url,
            body: Some(body),
            headers,
        }
    }
}

/// Response returned by the transport when the request reached the collector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Raw response body. In debug mode this carries the collector's
    /// validation echo.
    pub body: String,
}

impl TransportResponse {
    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Transport-level failure: the request never produced an HTTP response.
///
/// Non-2xx responses are not transport errors; the flusher interprets those.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Connection, DNS or protocol failure.
    Connect(String),
    /// The transport's own request deadline elapsed.
    Timeout,
}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportError::Connect(reason) => write!(f, "transport failure: {}", reason),
            TransportError::Timeout => write!(f, "transport timed out"),
        }
    }
}

impl std::error::Error for TransportError {}

/// Port for the outbound HTTP capability.
///
/// The tracker core does not own TLS handling, redirects or pooling; it hands
/// a fully-formed [`HitRequest`] to an adapter and awaits the outcome. The
/// await inside a flush is the core's only suspension point.
pub trait Transport: Send + Sync {
    /// Execute one request against the collection endpoint.
    fn execute(
        &self,
        request: HitRequest,
    ) -> impl Future<Output = Result<TransportResponse, TransportError>> + Send;
}

/// Port for obtaining wall-clock time.
///
/// Hit timestamps and the `z` cache buster are whole seconds since the Unix
/// epoch. Infrastructure provides concrete implementations (SystemClock,
/// MockClock).
pub trait Clock: Send + Sync + Debug {
    /// Current time in whole seconds since the Unix epoch.
    fn now(&self) -> u64;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_method_names() {
        assert_eq!(HitMethod::Get.as_str(), "GET");
        assert_eq!(HitMethod::Post.as_str(), "POST");
    }

    #[test]
    fn test_response_success_range() {
        let ok = TransportResponse {
            status: 200,
            body: String::new(),
        };
        let no_content = TransportResponse {
            status: 204,
            body: String::new(),
        };
        let redirect = TransportResponse {
            status: 302,
            body: String::new(),
        };
        let server_error = TransportResponse {
            status: 500,
            body: String::new(),
        };
        assert!(ok.is_success());
        assert!(no_content.is_success());
        assert!(!redirect.is_success());
        assert!(!server_error.is_success());
    }

    #[test]
    fn test_request_constructors() {
        let get = HitRequest::get("https://example.test/collect?v=1".to_string());
        assert_eq!(get.method, HitMethod::Get);
        assert!(get.body.is_none());
        assert!(get.headers.is_empty());

        let post = HitRequest::post(
            "https://example.test/batch".to_string(),
            "v=1".to_string(),
            vec![("cache-control".to_string(), "no-cache".to_string())],
        );
        assert_eq!(post.method, HitMethod::Post);
        assert_eq!(post.body.as_deref(), Some("v=1"));
    }
}
