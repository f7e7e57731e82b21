//! Executes [`HttpRequest`] values against the network.
//!
//! The sync engine is generic over [`Transport`] so it can be driven by a
//! real HTTP agent or by a scripted in-memory double. Non-2xx statuses are
//! data, not errors: a `TransportError` means no response arrived at all.

use std::future::Future;

use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Failures below the HTTP layer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// Connection refused, DNS failure, I/O error while reading the body.
    #[error("{0}")]
    Request(String),

    /// The blocking worker running the request panicked or was cancelled.
    #[error("transport worker failed: {0}")]
    Join(String),
}

/// Async request executor.
pub trait Transport: Send + Sync {
    /// Send `request` and return whatever the server answered.
    fn execute(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, TransportError>> + Send;
}

/// [`Transport`] backed by a blocking `ureq` agent.
///
/// Each request runs on tokio's blocking pool, so the calling task only
/// suspends at the await point.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let agent = self.agent.clone();
        tokio::task::spawn_blocking(move || execute_blocking(&agent, request))
            .await
            .map_err(|e| TransportError::Join(e.to_string()))?
    }
}

fn execute_blocking(agent: &ureq::Agent, request: HttpRequest) -> Result<HttpResponse, TransportError> {
    let HttpRequest {
        method,
        path,
        headers,
        body,
    } = request;
    tracing::trace!(%method, %path, "executing request");

    let result = match method {
        HttpMethod::Get => with_headers(agent.get(&path), &headers).call(),
        HttpMethod::Delete => with_headers(agent.delete(&path), &headers).call(),
        HttpMethod::Post => send_body(with_headers(agent.post(&path), &headers), body),
        HttpMethod::Put => send_body(with_headers(agent.put(&path), &headers), body),
    };
    let mut response = result.map_err(|e| TransportError::Request(e.to_string()))?;

    let status = response.status().as_u16();
    let headers = response
        .headers()
        .iter()
        .map(|(k, v)| (k.as_str().to_string(), v.to_str().unwrap_or_default().to_string()))
        .collect();
    let body = response
        .body_mut()
        .read_to_string()
        .map_err(|e| TransportError::Request(e.to_string()))?;

    Ok(HttpResponse { status, headers, body })
}

fn with_headers<B>(mut builder: ureq::RequestBuilder<B>, headers: &[(String, String)]) -> ureq::RequestBuilder<B> {
    for (key, value) in headers {
        builder = builder.header(key.as_str(), value.as_str());
    }
    builder
}

fn send_body(
    builder: ureq::RequestBuilder<ureq::typestate::WithBody>,
    body: Option<String>,
) -> Result<ureq::http::Response<ureq::Body>, ureq::Error> {
    match body {
        Some(body) => builder.send(body.as_bytes()),
        None => builder.send_empty(),
    }
}
