//! Error types for the request pipeline.
//!
//! # Design
//! The taxonomy is closed: every failed call ends in exactly one of these five
//! variants and nothing is retried. `HttpStatus` keeps the raw status code and
//! body text so a failure can be diagnosed without re-issuing the call.

/// Boxed cause reported by a `Transport`.
pub type TransportError = Box<dyn std::error::Error + Send + Sync>;

/// The terminal failure of one call.
#[derive(Debug, thiserror::Error)]
pub enum NetError {
    /// The URL string could not be parsed into an absolute URL. No request
    /// was sent.
    #[error("invalid URL: {raw:?}")]
    InvalidUrl { raw: String },

    /// The transport failed before producing a response (DNS, connect,
    /// timeout, I/O).
    #[error("transport failed: {0}")]
    Transport(#[source] TransportError),

    /// The server answered with status >= 400.
    #[error("HTTP {code}: {body}")]
    HttpStatus { body: String, code: u16 },

    /// An error response body was not valid UTF-8 text.
    #[error("response body is not valid UTF-8")]
    Undecodable,

    /// The response body could not be deserialized into the expected type.
    #[error("decoding failed: {0}")]
    Decode(#[source] serde_json::Error),
}

impl NetError {
    /// Status code carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            NetError::HttpStatus { code, .. } => Some(*code),
            _ => None,
        }
    }
}

/// Two errors are equal when they are the same kind with the same payload.
/// Boxed transport causes and decode errors compare by their message.
impl PartialEq for NetError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (NetError::InvalidUrl { raw: a }, NetError::InvalidUrl { raw: b }) => a == b,
            (NetError::Transport(a), NetError::Transport(b)) => a.to_string() == b.to_string(),
            (
                NetError::HttpStatus { body: a, code: x },
                NetError::HttpStatus { body: b, code: y },
            ) => x == y && a == b,
            (NetError::Undecodable, NetError::Undecodable) => true,
            (NetError::Decode(a), NetError::Decode(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
