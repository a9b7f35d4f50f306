//! Value types that flow in and out of the executor.

use serde_json::{Map, Value};

use crate::error::NetError;

/// The terminal result of one call.
pub type Outcome<T> = Result<Response<T>, NetError>;

/// A successful call: the payload plus the status code the transport
/// reported. `status` is `None` only when the transport has no status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response<T> {
    pub data: T,
    pub status: Option<u16>,
}

impl<T> Response<T> {
    pub fn new(data: T, status: Option<u16>) -> Self {
        Self { data, status }
    }

    pub fn into_data(self) -> T {
        self.data
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Response<U> {
        Response {
            data: f(self.data),
            status: self.status,
        }
    }
}

/// Request payload supplied by the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// Sent verbatim.
    Bytes(Vec<u8>),
    /// Serialized to a JSON object, or omitted when empty.
    Json(Map<String, Value>),
}

impl RequestBody {
    /// The bytes to put on the wire, if any.
    ///
    /// An empty mapping produces no body. A mapping that fails to serialize
    /// also produces no body; the failure is logged and otherwise dropped.
    pub fn into_bytes(self) -> Option<Vec<u8>> {
        match self {
            RequestBody::Bytes(bytes) => Some(bytes),
            RequestBody::Json(map) if map.is_empty() => None,
            RequestBody::Json(map) => match serde_json::to_vec(&map) {
                Ok(bytes) => Some(bytes),
                Err(e) => {
                    log::debug!("dropping request body that failed to serialize: {e}");
                    None
                }
            },
        }
    }
}

impl From<Vec<u8>> for RequestBody {
    fn from(bytes: Vec<u8>) -> Self {
        RequestBody::Bytes(bytes)
    }
}

impl From<Map<String, Value>> for RequestBody {
    fn from(map: Map<String, Value>) -> Self {
        RequestBody::Json(map)
    }
}
