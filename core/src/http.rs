//! HTTP transport types for the request/response pipeline.
//!
//! # Design
//! These types describe one HTTP exchange as plain data. The executor builds a
//! `RequestDescriptor`, hands it to a `Transport`, and classifies the
//! `HttpResponse` it gets back. Keeping them as data lets the pipeline be
//! exercised without a network, and lets hosts that do their own I/O reuse
//! the classification step directly.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use url::Url;

/// Status code that short-circuits to a payload-less success.
pub const NO_CONTENT: u16 = 204;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    #[default]
    Get,
    Head,
    Post,
    Put,
    Delete,
    Connect,
    Options,
    Trace,
}

impl HttpMethod {
    /// The uppercase token sent on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Head => "HEAD",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Connect => "CONNECT",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Trace => "TRACE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string is not one of the eight supported method tokens.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported HTTP method: {0}")]
pub struct UnknownMethod(pub String);

impl FromStr for HttpMethod {
    type Err = UnknownMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GET" => Ok(HttpMethod::Get),
            "HEAD" => Ok(HttpMethod::Head),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "DELETE" => Ok(HttpMethod::Delete),
            "CONNECT" => Ok(HttpMethod::Connect),
            "OPTIONS" => Ok(HttpMethod::Options),
            "TRACE" => Ok(HttpMethod::Trace),
            other => Err(UnknownMethod(other.to_string())),
        }
    }
}

/// One request, validated and ready to submit.
///
/// Fields are private so a descriptor cannot change after it is built. It is
/// moved into the transport, which consumes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    url: Url,
    method: HttpMethod,
    headers: BTreeMap<String, String>,
    body: Option<Vec<u8>>,
}

impl RequestDescriptor {
    pub fn new(url: Url, method: HttpMethod) -> Self {
        Self {
            url,
            method,
            headers: BTreeMap::new(),
            body: None,
        }
    }

    pub fn with_headers(mut self, headers: BTreeMap<String, String>) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_body(mut self, body: Option<Vec<u8>>) -> Self {
        self.body = body;
        self
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    /// Split into owned parts for a transport to consume.
    pub fn into_parts(self) -> (Url, HttpMethod, BTreeMap<String, String>, Option<Vec<u8>>) {
        (self.url, self.method, self.headers, self.body)
    }
}

/// An HTTP response described as plain data.
///
/// `status` is `None` when the transport has no notion of a status code
/// (e.g. a `file://` loader). Such responses take the decode path and carry
/// no status in the outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: Option<u16>,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: Some(status),
            headers: Vec::new(),
            body: body.into(),
        }
    }

    /// A response from a transport that reports no status code.
    pub fn without_status(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: None,
            headers: Vec::new(),
            body: body.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_tokens_parse_back() {
        for method in [
            HttpMethod::Get,
            HttpMethod::Head,
            HttpMethod::Post,
            HttpMethod::Put,
            HttpMethod::Delete,
            HttpMethod::Connect,
            HttpMethod::Options,
            HttpMethod::Trace,
        ] {
            assert_eq!(method.as_str().parse::<HttpMethod>(), Ok(method));
        }
    }

    #[test]
    fn lowercase_method_is_rejected() {
        let err = "get".parse::<HttpMethod>().unwrap_err();
        assert_eq!(err, UnknownMethod("get".to_string()));
    }

    #[test]
    fn default_method_is_get() {
        assert_eq!(HttpMethod::default(), HttpMethod::Get);
    }

    #[test]
    fn descriptor_starts_without_headers_or_body() {
        let url = Url::parse("https://kamaal.io/").unwrap();
        let descriptor = RequestDescriptor::new(url.clone(), HttpMethod::Post);
        assert_eq!(descriptor.url(), &url);
        assert_eq!(descriptor.method(), HttpMethod::Post);
        assert!(descriptor.headers().is_empty());
        assert!(descriptor.body().is_none());
    }
}
