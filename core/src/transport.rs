//! The seam between the dispatcher and the network.
//!
//! # Design
//! The dispatcher never does I/O itself; it hands an `HttpRequest` to a
//! `Transport` and decodes whatever comes back. Connection pooling, TLS,
//! redirects and timeouts are the transport's business. `UreqTransport` is the
//! default implementation; tests substitute an in-memory one.

use async_trait::async_trait;
use thiserror::Error;

use crate::http::{HttpRequest, HttpResponse};

/// Failure to complete a round-trip.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Could not reach the host (refused, reset, DNS failure).
    #[error("connection error: {0}")]
    Connection(String),
    /// The transport gave up waiting.
    #[error("request timeout")]
    Timeout,
    /// The request could not be sent as built, e.g. an unparseable URL.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("{0}")]
    Other(String),
}

/// Executes one HTTP request.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

#[cfg(feature = "ureq")]
pub use self::ureq_backend::UreqTransport;

#[cfg(feature = "ureq")]
mod ureq_backend {
    use async_trait::async_trait;

    use super::{Transport, TransportError};
    use crate::http::{HttpMethod, HttpRequest, HttpResponse};

    /// Blocking `ureq` agent driven from a tokio blocking thread.
    ///
    /// Must be used from within a tokio runtime.
    #[derive(Debug, Clone)]
    pub struct UreqTransport {
        agent: ureq::Agent,
    }

    impl UreqTransport {
        /// Agent that returns 4xx/5xx responses as data instead of errors.
        pub fn new() -> Self {
            let agent = ureq::Agent::config_builder()
                .http_status_as_error(false)
                .build()
                .new_agent();
            Self { agent }
        }

        /// Use a caller-configured agent (timeouts, proxy, TLS).
        pub fn with_agent(agent: ureq::Agent) -> Self {
            Self { agent }
        }
    }

    impl Default for UreqTransport {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl Transport for UreqTransport {
        async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
            let agent = self.agent.clone();
            tokio::task::spawn_blocking(move || execute(&agent, request))
                .await
                .map_err(|e| TransportError::Other(e.to_string()))?
        }
    }

    fn with_headers<B>(
        mut builder: ureq::RequestBuilder<B>,
        headers: &[(String, String)],
    ) -> ureq::RequestBuilder<B> {
        for (name, value) in headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder
    }

    fn execute(agent: &ureq::Agent, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let headers = request.wire_headers();
        let url = request.url.as_str();

        let result = match (request.method, request.body) {
            (HttpMethod::Get, None) => with_headers(agent.get(url), &headers).call(),
            (HttpMethod::Get, Some(body)) => with_headers(agent.get(url), &headers)
                .force_send_body()
                .send(body.as_bytes()),
            (HttpMethod::Delete, None) => with_headers(agent.delete(url), &headers).call(),
            (HttpMethod::Delete, Some(body)) => with_headers(agent.delete(url), &headers)
                .force_send_body()
                .send(body.as_bytes()),
            (HttpMethod::Post, Some(body)) => with_headers(agent.post(url), &headers).send(body.as_bytes()),
            (HttpMethod::Post, None) => with_headers(agent.post(url), &headers).send_empty(),
            (HttpMethod::Put, Some(body)) => with_headers(agent.put(url), &headers).send(body.as_bytes()),
            (HttpMethod::Put, None) => with_headers(agent.put(url), &headers).send_empty(),
            (HttpMethod::Patch, Some(body)) => with_headers(agent.patch(url), &headers).send(body.as_bytes()),
            (HttpMethod::Patch, None) => with_headers(agent.patch(url), &headers).send_empty(),
        };
        let mut response = result.map_err(TransportError::from)?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(TransportError::from)?;

        Ok(HttpResponse { status, headers, body })
    }

    impl From<ureq::Error> for TransportError {
        fn from(err: ureq::Error) -> Self {
            match err {
                ureq::Error::Timeout(_) => TransportError::Timeout,
                ureq::Error::HostNotFound | ureq::Error::ConnectionFailed => {
                    TransportError::Connection(err.to_string())
                }
                ureq::Error::Io(io_err) => TransportError::Connection(io_err.to_string()),
                ureq::Error::BadUri(_) | ureq::Error::Http(_) => {
                    TransportError::InvalidRequest(err.to_string())
                }
                _ => TransportError::Other(err.to_string()),
            }
        }
    }
}
