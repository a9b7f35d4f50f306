//! The network collaborator and its default ureq implementation.
//!
//! # Design
//! `Transport` is the only place the pipeline suspends: it takes one
//! descriptor and resolves to one response or one error. Status codes are
//! data at this layer; a 404 is a successful transport call.
//!
//! `UreqTransport` drives a blocking `ureq::Agent` on tokio's blocking pool so
//! the executor stays async without owning threads of its own.

use std::fmt;
use std::future::Future;

use crate::error::TransportError;
use crate::http::{HttpResponse, RequestDescriptor};
use crate::options::TransportConfig;

/// Executes a single request.
///
/// `priority` is a hint in `[0, 1]`; implementations without prioritization
/// ignore it.
pub trait Transport: Send + Sync {
    fn send(
        &self,
        request: RequestDescriptor,
        priority: f32,
    ) -> impl Future<Output = Result<HttpResponse, TransportError>> + Send;
}

/// Default transport backed by `ureq`.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
    max_body_bytes: u64,
}

impl UreqTransport {
    pub fn new(config: TransportConfig) -> Self {
        // 4xx/5xx must come back as responses so the pipeline can classify them.
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(config.timeout)
            .build()
            .new_agent();
        Self {
            agent,
            max_body_bytes: config.max_body_bytes,
        }
    }
}

impl fmt::Debug for UreqTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UreqTransport")
            .field("max_body_bytes", &self.max_body_bytes)
            .finish_non_exhaustive()
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(TransportConfig::default())
    }
}

impl Transport for UreqTransport {
    fn send(
        &self,
        request: RequestDescriptor,
        priority: f32,
    ) -> impl Future<Output = Result<HttpResponse, TransportError>> + Send {
        let agent = self.agent.clone();
        let max_body_bytes = self.max_body_bytes;
        async move {
            log::trace!("ureq has no prioritization, ignoring priority {priority}");
            tokio::task::spawn_blocking(move || call(&agent, request, max_body_bytes))
                .await
                .unwrap_or_else(|e| Err(e.into()))
        }
    }
}

fn call(
    agent: &ureq::Agent,
    request: RequestDescriptor,
    max_body_bytes: u64,
) -> Result<HttpResponse, TransportError> {
    let (url, method, headers, body) = request.into_parts();

    let mut builder = ureq::http::Request::builder()
        .method(method.as_str())
        .uri(url.as_str());
    for (name, value) in &headers {
        builder = builder.header(name.as_str(), value.as_str());
    }

    let response = match body {
        Some(bytes) => agent.run(builder.body(bytes)?)?,
        None => agent.run(builder.body(())?)?,
    };

    let (parts, mut body) = response.into_parts();
    let headers = parts
        .headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|value| (name.as_str().to_string(), value.to_string()))
        })
        .collect();
    let body = body.with_config().limit(max_body_bytes).read_to_vec()?;

    Ok(HttpResponse {
        status: Some(parts.status.as_u16()),
        headers,
        body,
    })
}
