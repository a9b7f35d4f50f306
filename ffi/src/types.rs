//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type with C-compatible representations:
//! `*const c_char` for strings, pointer + length for byte buffers, and tagged
//! enums with explicit discriminants. Conversion helpers live here to keep
//! `lib.rs` focused on the `extern "C"` surface.

use std::ffi::CString;
use std::os::raw::{c_char, c_void};

use serde_json::Value;
use xnet_core::{Executor, HttpMethod, NetError, Outcome, UreqTransport};

/// Opaque handle owning a tokio runtime and an executor. C callers receive a
/// pointer to this and pass it back into every FFI function.
pub struct FfiClient {
    pub(crate) runtime: tokio::runtime::Runtime,
    pub(crate) executor: Executor<UreqTransport>,
}

// ---------------------------------------------------------------------------
// Request types (caller-provided, read but never freed by us)
// ---------------------------------------------------------------------------

/// HTTP method as a C enum.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiHttpMethod {
    Get = 0,
    Head = 1,
    Post = 2,
    Put = 3,
    Delete = 4,
    Connect = 5,
    Options = 6,
    Trace = 7,
}

impl From<FfiHttpMethod> for HttpMethod {
    fn from(m: FfiHttpMethod) -> Self {
        match m {
            FfiHttpMethod::Get => HttpMethod::Get,
            FfiHttpMethod::Head => HttpMethod::Head,
            FfiHttpMethod::Post => HttpMethod::Post,
            FfiHttpMethod::Put => HttpMethod::Put,
            FfiHttpMethod::Delete => HttpMethod::Delete,
            FfiHttpMethod::Connect => HttpMethod::Connect,
            FfiHttpMethod::Options => HttpMethod::Options,
            FfiHttpMethod::Trace => HttpMethod::Trace,
        }
    }
}

/// A single HTTP header. Entries with a null key or value are skipped.
#[repr(C)]
pub struct FfiHeader {
    pub key: *const c_char,
    pub value: *const c_char,
}

/// Parameters for one JSON request.
///
/// `headers` may be null when `headers_len` is 0; `body` may be null for no
/// body. The body is sent verbatim, so JSON payloads must be pre-encoded.
#[repr(C)]
pub struct FfiRequest {
    pub url: *const c_char,
    pub method: FfiHttpMethod,
    pub headers: *const FfiHeader,
    pub headers_len: u32,
    pub body: *const u8,
    pub body_len: usize,
    pub priority: f32,
    pub verbose: bool,
}

/// Completion callback. Invoked exactly once per submitted call; the callee
/// owns `outcome` and must release it with `xnet_outcome_free`.
pub type FfiCallback = extern "C" fn(outcome: *mut FfiOutcome, user_data: *mut c_void);

/// Caller context passed back to the callback untouched.
struct UserData(*mut c_void);

// The pointer is never dereferenced on our side; thread-safety of the
// pointee is the C caller's contract.
unsafe impl Send for UserData {}

/// A pending callback invocation that fires exactly once.
///
/// If the task holding it is dropped before `deliver` runs (the client was
/// freed mid-flight), the callback receives a `Transport` failure instead.
pub(crate) struct Completion {
    callback: FfiCallback,
    user_data: UserData,
    delivered: bool,
}

impl Completion {
    pub(crate) fn new(callback: FfiCallback, user_data: *mut c_void) -> Self {
        Self {
            callback,
            user_data: UserData(user_data),
            delivered: false,
        }
    }

    pub(crate) fn deliver(mut self, outcome: *mut FfiOutcome) {
        self.delivered = true;
        (self.callback)(outcome, self.user_data.0);
    }
}

impl Drop for Completion {
    fn drop(&mut self) {
        if !self.delivered {
            let cancelled = NetError::Transport("request cancelled: client freed".into());
            (self.callback)(FfiOutcome::from_error(cancelled), self.user_data.0);
        }
    }
}

// ---------------------------------------------------------------------------
// Outcome types
// ---------------------------------------------------------------------------

/// Error codes returned in `FfiOutcome`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    InvalidUrl = 1,
    Transport = 2,
    HttpStatus = 3,
    Undecodable = 4,
    Decode = 5,
    NullArg = 6,
    Panic = 7,
}

/// Outcome envelope for every call.
///
/// On success `error_code` is `Ok`, `error_message` is null, and `data` /
/// `data_len` hold the payload (JSON text for requests, raw bytes for
/// loads). `data` is null for a payload-less success (HTTP 204).
/// On failure `error_code` names the category and `error_message` is a
/// human-readable C string. For `HttpStatus`, `data` / `data_len` hold the
/// response body exactly as received; for every other failure `data` is
/// null. `http_status` is 0 when no status code applies.
#[repr(C)]
pub struct FfiOutcome {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub http_status: u16,
    pub data: *mut u8,
    pub data_len: usize,
}

impl FfiOutcome {
    /// Build a success outcome, optionally carrying a payload.
    pub(crate) fn ok(data: Option<Vec<u8>>, status: Option<u16>) -> *mut Self {
        Self::boxed(FfiErrorCode::Ok, std::ptr::null_mut(), status.unwrap_or(0), data)
    }

    /// Convert a JSON-request outcome, re-encoding the decoded value.
    pub(crate) fn from_json(outcome: Outcome<Option<Value>>) -> *mut Self {
        match outcome {
            Ok(response) => match response.data.map(|v| serde_json::to_vec(&v)).transpose() {
                Ok(data) => Self::ok(data, response.status),
                Err(e) => Self::from_error(NetError::Decode(e)),
            },
            Err(e) => Self::from_error(e),
        }
    }

    pub(crate) fn from_bytes(outcome: Outcome<Vec<u8>>) -> *mut Self {
        match outcome {
            Ok(response) => Self::ok(Some(response.data), response.status),
            Err(e) => Self::from_error(e),
        }
    }

    /// Build an error outcome from a `NetError`. `HttpStatus` bodies are
    /// also handed over verbatim in `data`.
    pub(crate) fn from_error(err: NetError) -> *mut Self {
        let error_code = match &err {
            NetError::InvalidUrl { .. } => FfiErrorCode::InvalidUrl,
            NetError::Transport(_) => FfiErrorCode::Transport,
            NetError::HttpStatus { .. } => FfiErrorCode::HttpStatus,
            NetError::Undecodable => FfiErrorCode::Undecodable,
            NetError::Decode(_) => FfiErrorCode::Decode,
        };
        let message = c_string(err.to_string());
        let status = err.status().unwrap_or(0);
        let body = match err {
            NetError::HttpStatus { body, .. } => Some(body.into_bytes()),
            _ => None,
        };
        Self::boxed(error_code, message, status, body)
    }

    /// Build an error outcome for a null argument.
    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::failure(FfiErrorCode::NullArg, format!("null argument: {name}"))
    }

    /// Build an error outcome for a caught panic.
    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::failure(FfiErrorCode::Panic, msg.to_string())
    }

    fn failure(error_code: FfiErrorCode, msg: String) -> *mut Self {
        Self::boxed(error_code, c_string(msg), 0, None)
    }

    fn boxed(
        error_code: FfiErrorCode,
        error_message: *mut c_char,
        http_status: u16,
        data: Option<Vec<u8>>,
    ) -> *mut Self {
        let (data, data_len) = match data {
            Some(bytes) => {
                let len = bytes.len();
                (Box::into_raw(bytes.into_boxed_slice()) as *mut u8, len)
            }
            None => (std::ptr::null_mut(), 0),
        };
        Box::into_raw(Box::new(FfiOutcome {
            error_code,
            error_message,
            http_status,
            data,
            data_len,
        }))
    }
}

/// Response bodies may contain NUL bytes; strip them so the message survives.
fn c_string(msg: String) -> *mut c_char {
    let msg = if msg.contains('\0') {
        msg.replace('\0', "")
    } else {
        msg
    };
    CString::new(msg).unwrap_or_default().into_raw()
}
