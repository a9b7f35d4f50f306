//! Caller-supplied request parameters and their resolution into a
//! `RequestDescriptor`.
//!
//! # Design
//! `Request` is the loose, caller-facing form: the URL may still be an
//! unparsed string and every other field has a default. `into_parts`
//! validates it once and produces the immutable descriptor the transport
//! consumes. Headers are applied exactly as given; nothing is injected.

use std::collections::BTreeMap;

use url::Url;

use crate::error::NetError;
use crate::http::{HttpMethod, RequestDescriptor};
use crate::options::RequestOptions;
use crate::types::RequestBody;

/// A URL that is either already validated or still needs parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlSource {
    Parsed(Url),
    Raw(String),
}

impl UrlSource {
    /// Resolve to an absolute URL or fail with `InvalidUrl`.
    pub fn resolve(self) -> Result<Url, NetError> {
        match self {
            UrlSource::Parsed(url) => Ok(url),
            UrlSource::Raw(raw) => match Url::parse(&raw) {
                Ok(url) if !url.cannot_be_a_base() => Ok(url),
                _ => Err(NetError::InvalidUrl { raw }),
            },
        }
    }
}

impl From<Url> for UrlSource {
    fn from(url: Url) -> Self {
        UrlSource::Parsed(url)
    }
}

impl From<&Url> for UrlSource {
    fn from(url: &Url) -> Self {
        UrlSource::Parsed(url.clone())
    }
}

impl From<&str> for UrlSource {
    fn from(raw: &str) -> Self {
        UrlSource::Raw(raw.to_string())
    }
}

impl From<String> for UrlSource {
    fn from(raw: String) -> Self {
        UrlSource::Raw(raw)
    }
}

/// Parameters for one call. Everything except the URL is optional.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    url: UrlSource,
    method: HttpMethod,
    headers: Option<BTreeMap<String, String>>,
    body: Option<RequestBody>,
    options: Option<RequestOptions>,
}

impl Request {
    pub fn new(url: impl Into<UrlSource>) -> Self {
        Self {
            url: url.into(),
            method: HttpMethod::Get,
            headers: None,
            body: None,
            options: None,
        }
    }

    pub fn get(url: impl Into<UrlSource>) -> Self {
        Self::new(url)
    }

    pub fn post(url: impl Into<UrlSource>) -> Self {
        Self::new(url).method(HttpMethod::Post)
    }

    pub fn method(mut self, method: HttpMethod) -> Self {
        self.method = method;
        self
    }

    /// Add one header, creating the header set if needed.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), value.into());
        self
    }

    /// Replace the header set.
    pub fn headers(mut self, headers: BTreeMap<String, String>) -> Self {
        self.headers = Some(headers);
        self
    }

    pub fn body(mut self, body: impl Into<RequestBody>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn options(mut self, options: RequestOptions) -> Self {
        self.options = Some(options);
        self
    }

    /// Validate the URL and produce the descriptor plus the effective options.
    pub fn into_parts(self) -> Result<(RequestDescriptor, RequestOptions), NetError> {
        let url = self.url.resolve()?;
        let descriptor = RequestDescriptor::new(url, self.method)
            .with_headers(self.headers.unwrap_or_default())
            .with_body(self.body.and_then(RequestBody::into_bytes));
        Ok((descriptor, self.options.unwrap_or_default()))
    }
}
