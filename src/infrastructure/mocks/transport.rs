//! Mock transport for testing.

use crate::application::ports::{HitRequest, Transport, TransportError, TransportResponse};
use std::future::{ready, Future};
use std::sync::{Arc, Mutex};

/// Scripted outcome the mock returns for every request.
#[derive(Debug, Clone)]
enum Behavior {
    Respond { status: u16, body: String },
    Fail(TransportError),
}

/// Mock transport recording every request and answering from a script.
///
/// Clones share the same recorded request log and script, so a clone can be
/// handed to the tracker while the test keeps one for assertions.
#[derive(Debug, Clone)]
pub struct MockTransport {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Debug)]
struct Inner {
    requests: Vec<HitRequest>,
    behavior: Behavior,
}

impl MockTransport {
    /// Respond to every request with `200` and an empty body.
    pub fn ok() -> Self {
        Self::responding(200, "")
    }

    /// Respond to every request with the given status and an empty body.
    pub fn status(status: u16) -> Self {
        Self::responding(status, "")
    }

    /// Respond to every request with the given status and body.
    pub fn responding(status: u16, body: &str) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                requests: Vec::new(),
                behavior: Behavior::Respond {
                    status,
                    body: body.to_string(),
                },
            })),
        }
    }

    /// Fail every request with the given transport error.
    pub fn failing(error: TransportError) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                requests: Vec::new(),
                behavior: Behavior::Fail(error),
            })),
        }
    }

    /// Change the scripted outcome for subsequent requests.
    pub fn set_response(&self, status: u16, body: &str) {
        self.lock().behavior = Behavior::Respond {
            status,
            body: body.to_string(),
        };
    }

    /// Every request executed so far, in order.
    pub fn requests(&self) -> Vec<HitRequest> {
        self.lock().requests.clone()
    }

    /// Number of requests executed so far.
    pub fn request_count(&self) -> usize {
        self.lock().requests.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner
            .lock()
            .expect("MockTransport mutex poisoned - a test thread panicked while holding the lock")
    }
}

impl Transport for MockTransport {
    fn execute(
        &self,
        request: HitRequest,
    ) -> impl Future<Output = Result<TransportResponse, TransportError>> + Send {
        let result = {
            let mut inner = self.lock();
            inner.requests.push(request);
            match &inner.behavior {
                Behavior::Respond { status, body } => Ok(TransportResponse {
                    status: *status,
                    body: body.clone(),
                }),
                Behavior::Fail(error) => Err(error.clone()),
            }
        };
        ready(result)
    }
}
