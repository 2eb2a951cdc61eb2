//! Executes the plain-data requests built by `todo_core::TodoClient`.
//!
//! # Design
//! The core never touches the network. A `Transport` takes an
//! `HttpRequest`, performs the round-trip and hands back an `HttpResponse`
//! with whatever status the server sent: 4xx/5xx are data here, not errors.
//! Only a missing response (refused connection, DNS failure, broken body)
//! is a `TransportError`.

use async_trait::async_trait;
use thiserror::Error;
use todo_core::{HttpMethod, HttpRequest, HttpResponse};

/// The round-trip produced no usable response.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct TransportError(pub String);

#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Blocking `ureq` agent driven from the async side through
/// `spawn_blocking`, so a pending call suspends only its caller.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        // Disable status-as-error so 4xx/5xx come back as responses and the
        // core client decides what they mean.
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

#[async_trait]
impl Transport for UreqTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let agent = self.agent.clone();
        tokio::task::spawn_blocking(move || send(&agent, request))
            .await
            .map_err(|e| TransportError(format!("request task failed: {e}")))?
    }
}

fn send(agent: &ureq::Agent, req: HttpRequest) -> Result<HttpResponse, TransportError> {
    let content_type = req
        .headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("content-type"))
        .map(|(_, v)| v.clone())
        .unwrap_or_else(|| "application/json".to_string());

    let result = match (req.method, req.body) {
        (HttpMethod::Get, _) => agent.get(&req.path).call(),
        (HttpMethod::Delete, _) => agent.delete(&req.path).call(),
        (HttpMethod::Post, Some(body)) => agent.post(&req.path).content_type(content_type.as_str()).send(body.as_bytes()),
        (HttpMethod::Post, None) => agent.post(&req.path).send_empty(),
        (HttpMethod::Put, Some(body)) => agent.put(&req.path).content_type(content_type.as_str()).send(body.as_bytes()),
        (HttpMethod::Put, None) => agent.put(&req.path).send_empty(),
        (HttpMethod::Patch, Some(body)) => agent.patch(&req.path).content_type(content_type.as_str()).send(body.as_bytes()),
        (HttpMethod::Patch, None) => agent.patch(&req.path).send_empty(),
    };
    let mut response = result.map_err(|e| TransportError(e.to_string()))?;

    let status = response.status().as_u16();
    let headers = response
        .headers()
        .iter()
        .map(|(k, v)| (k.as_str().to_string(), v.to_str().unwrap_or_default().to_string()))
        .collect();
    let body = response
        .body_mut()
        .read_to_string()
        .map_err(|e| TransportError(format!("failed to read response body: {e}")))?;

    Ok(HttpResponse { status, headers, body })
}
