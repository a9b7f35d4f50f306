//! Asynchronous HTTP request core with typed JSON outcomes.
//!
//! # Overview
//! Builds one request from a URL, method, headers and body, submits it to a
//! `Transport`, and classifies the response into an `Outcome`: a decoded
//! payload with its status code, or exactly one `NetError`.
//!
//! # Design
//! - `Request` is the loose caller-facing input; `RequestDescriptor` is the
//!   validated, immutable form handed to the transport.
//! - `Executor` keeps no per-call state, only its transport and a verbose
//!   default. It performs one transport call per operation and never
//!   retries.
//! - Response classification lives in `pipeline` as pure functions, so hosts
//!   that run their own I/O can use it directly.
//! - Callback front-ends wrap the awaitable methods; they do not duplicate
//!   the pipeline.

pub mod error;
pub mod executor;
pub mod http;
pub mod options;
pub mod pipeline;
pub mod request;
pub mod transport;
pub mod types;

#[cfg(test)]
mod testing;

use serde::de::DeserializeOwned;

pub use error::{NetError, TransportError};
pub use executor::Executor;
pub use http::{HttpMethod, HttpResponse, RequestDescriptor, NO_CONTENT};
pub use options::{RequestOptions, TransportConfig};
pub use pipeline::{parse_bytes_response, parse_json_response};
pub use request::{Request, UrlSource};
pub use transport::{Transport, UreqTransport};
pub use types::{Outcome, RequestBody, Response};

/// Run `request` on a default executor and decode the JSON body into `D`.
pub async fn execute<D: DeserializeOwned>(request: Request) -> Outcome<Option<D>> {
    Executor::new().execute(request).await
}

/// GET `url` on a default executor and return the raw body.
pub async fn load_bytes(url: impl Into<UrlSource>) -> Outcome<Vec<u8>> {
    Executor::new().load_bytes(url).await
}
