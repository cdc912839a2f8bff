//! HTTP transport adapter backed by reqwest.
//!
//! Production implementation of the [`Transport`] port. Connection pooling,
//! TLS and redirect handling are the client's concern; the tracker core only
//! hands over fully-formed requests. Enabled with the `reqwest-transport`
//! feature.

use crate::application::ports::{
    HitMethod, HitRequest, Transport, TransportError, TransportResponse,
};
use std::future::Future;
use std::time::Duration;

/// Configuration for [`ReqwestTransport`].
#[derive(Debug, Clone)]
pub struct ReqwestTransportConfig {
    /// Whole-request deadline. A timeout is reported as
    /// [`TransportError::Timeout`] and treated like any other transport
    /// failure.
    pub timeout: Duration,
}

impl Default for ReqwestTransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
        }
    }
}

/// [`Transport`] adapter over a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a transport with the default configuration.
    pub fn new() -> Result<Self, TransportError> {
        Self::with_config(ReqwestTransportConfig::default())
    }

    /// Build a transport with an explicit configuration.
    pub fn with_config(config: ReqwestTransportConfig) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| TransportError::Connect(e.to_string()))?;
        Ok(Self { client })
    }

    /// Wrap an existing client, e.g. one shared with the rest of the host
    /// application.
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

fn map_error(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::Connect(e.to_string())
    }
}

impl Transport for ReqwestTransport {
    fn execute(
        &self,
        request: HitRequest,
    ) -> impl Future<Output = Result<TransportResponse, TransportError>> + Send {
        let client = self.client.clone();
        async move {
            let mut builder = match request.method {
                HitMethod::Get => client.get(&request.url),
                HitMethod::Post => client.post(&request.url),
            };
            for (name, value) in &request.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
            if let Some(body) = request.body {
                builder = builder.body(body);
            }

            let response = builder.send().await.map_err(map_error)?;
            let status = response.status().as_u16();
            let body = response.text().await.map_err(map_error)?;
            Ok(TransportResponse { status, body })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_builds_with_defaults() {
        assert!(ReqwestTransport::new().is_ok());
    }

    #[test]
    fn test_transport_builds_with_custom_timeout() {
        let config = ReqwestTransportConfig {
            timeout: Duration::from_secs(5),
        };
        assert!(ReqwestTransport::with_config(config).is_ok());
    }
}
