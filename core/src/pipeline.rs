//! Response classification: status inspection, text decoding, JSON decoding.
//!
//! # Design
//! These functions are pure. They take an `HttpResponse` that some transport
//! produced and turn it into an `Outcome`, so a host that performs its own
//! I/O can reuse them without the executor. Classification looks only at the
//! numeric status code, never at headers or content type.

use serde::de::DeserializeOwned;

use crate::error::NetError;
use crate::http::{HttpResponse, NO_CONTENT};
use crate::options::RequestOptions;
use crate::types::{Outcome, Response};

/// Classify a response whose body is expected to be JSON for `T`.
///
/// - status >= 400: `HttpStatus` with the body text, or `Undecodable` if the
///   body is not UTF-8.
/// - status 204: success with no payload; the body is never parsed.
/// - anything else, including no status at all: decode the body as `T`.
pub fn parse_json_response<T>(response: HttpResponse, options: &RequestOptions) -> Outcome<Option<T>>
where
    T: DeserializeOwned,
{
    if options.verbose() {
        log_body(&response.body);
    }

    match response.status {
        Some(code) if code >= 400 => Err(status_error(response.body, code)),
        Some(NO_CONTENT) => Ok(Response::new(None, Some(NO_CONTENT))),
        status => serde_json::from_slice(&response.body)
            .map(|data| Response::new(Some(data), status))
            .map_err(NetError::Decode),
    }
}

/// Classify a response whose body is returned as raw bytes.
///
/// Any status outside `200..=299` is a failure. Without a status the body is
/// returned as-is.
pub fn parse_bytes_response(response: HttpResponse) -> Outcome<Vec<u8>> {
    match response.status {
        Some(code) if !(200..300).contains(&code) => Err(status_error(response.body, code)),
        status => Ok(Response::new(response.body, status)),
    }
}

fn status_error(body: Vec<u8>, code: u16) -> NetError {
    match String::from_utf8(body) {
        Ok(body) => NetError::HttpStatus { body, code },
        Err(_) => NetError::Undecodable,
    }
}

fn log_body(body: &[u8]) {
    match std::str::from_utf8(body) {
        Ok(text) => log::info!("response body: {text}"),
        Err(_) => log::info!("response body: {} bytes, not valid UTF-8", body.len()),
    }
}
