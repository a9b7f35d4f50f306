//! C-ABI wrapper around `xnet-core`.
//!
//! # Overview
//! Exposes the request executor through `extern "C"` functions so any
//! language with a C FFI can issue JSON requests and raw byte loads without
//! linking to Rust's async runtime or serde directly.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - Each operation comes in two styles over the same core call: a
//!   `*_blocking` single-shot that returns the outcome, and a callback form
//!   that returns immediately and invokes the callback exactly once.
//! - A single `FfiOutcome` envelope carries payloads and errors uniformly.
//! - The C caller owns all returned pointers and must call the matching
//!   `xnet_*_free` function to release them.

pub mod types;

use std::collections::BTreeMap;
use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_void};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Duration;

use serde_json::Value;
use xnet_core::{Executor, Request, RequestBody, RequestOptions, TransportConfig, UreqTransport};

use types::*;

/// Returned by the callback-style functions when the call was submitted.
pub const XNET_SUBMITTED: i32 = 0;
/// A required pointer argument was null; the callback will not fire.
pub const XNET_ERR_NULL_ARG: i32 = -1;
/// A panic was caught before submission; the callback will not fire.
pub const XNET_ERR_PANIC: i32 = -2;

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a client with its own runtime. `timeout_ms == 0` means no timeout.
///
/// Returns null if the runtime cannot be started or an internal panic occurs.
/// The caller must free the returned pointer with `xnet_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn xnet_client_new(timeout_ms: u64) -> *mut FfiClient {
    catch_unwind(|| {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(e) => {
                log::error!("failed to start runtime: {e}");
                return std::ptr::null_mut();
            }
        };
        let mut config = TransportConfig::default();
        if timeout_ms > 0 {
            config = config.with_timeout(Duration::from_millis(timeout_ms));
        }
        let executor = Executor::with_transport(UreqTransport::new(config));
        Box::into_raw(Box::new(FfiClient { runtime, executor }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a client created by `xnet_client_new`. Safe to call with null.
///
/// Returns without waiting for calls still in flight. Each of their
/// callbacks fires once with a `Transport` failure, possibly after this
/// function has returned. Must not be called from inside a callback.
#[unsafe(no_mangle)]
pub extern "C" fn xnet_client_free(client: *mut FfiClient) {
    if !client.is_null() {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            let client = *unsafe { Box::from_raw(client) };
            client.runtime.shutdown_background();
        }));
    }
}

/// Clamp a priority hint into `[0, 1]` the way requests do.
#[unsafe(no_mangle)]
pub extern "C" fn xnet_clamp_priority(priority: f32) -> f32 {
    RequestOptions::new(priority, false).priority()
}

// ---------------------------------------------------------------------------
// Argument conversion
// ---------------------------------------------------------------------------

/// Read a C string. Invalid UTF-8 is replaced rather than rejected, so a bad
/// URL surfaces as `InvalidUrl` instead of a null-argument error.
///
/// # Safety
/// `ptr` must be non-null and point to a NUL-terminated string.
unsafe fn lossy_string(ptr: *const c_char) -> String {
    unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned()
}

/// Build a core `Request` from the C description.
///
/// # Safety
/// `req.url` must be a valid C string, `req.headers` must point to
/// `headers_len` entries when non-null, and `req.body` to `body_len` bytes
/// when non-null.
unsafe fn ffi_request_to_core(req: &FfiRequest) -> Request {
    let mut request = Request::new(unsafe { lossy_string(req.url) })
        .method(req.method.into())
        .options(RequestOptions::new(req.priority, req.verbose));

    if !req.headers.is_null() && req.headers_len > 0 {
        let entries = unsafe { std::slice::from_raw_parts(req.headers, req.headers_len as usize) };
        let headers: BTreeMap<String, String> = entries
            .iter()
            .filter(|h| !h.key.is_null() && !h.value.is_null())
            .map(|h| unsafe { (lossy_string(h.key), lossy_string(h.value)) })
            .collect();
        request = request.headers(headers);
    }

    if !req.body.is_null() {
        let body = unsafe { std::slice::from_raw_parts(req.body, req.body_len) };
        request = request.body(RequestBody::Bytes(body.to_vec()));
    }

    request
}

// ---------------------------------------------------------------------------
// Single-shot functions
// ---------------------------------------------------------------------------

/// Run one JSON request and block until it finishes.
///
/// On success `data` holds the response JSON re-encoded as UTF-8 text, or is
/// null for a 204. Must not be called from a thread that is already driving
/// a tokio runtime. The caller must free the result with `xnet_outcome_free`.
#[unsafe(no_mangle)]
pub extern "C" fn xnet_request_blocking(
    client: *const FfiClient,
    request: *const FfiRequest,
) -> *mut FfiOutcome {
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() {
            return FfiOutcome::null_arg("client");
        }
        if request.is_null() {
            return FfiOutcome::null_arg("request");
        }
        let client = unsafe { &*client };
        let req = unsafe { &*request };
        if req.url.is_null() {
            return FfiOutcome::null_arg("url");
        }
        let core_req = unsafe { ffi_request_to_core(req) };
        let outcome = client
            .runtime
            .block_on(client.executor.execute::<Value>(core_req));
        FfiOutcome::from_json(outcome)
    }))
    .unwrap_or_else(|_| FfiOutcome::panic("panic in xnet_request_blocking"))
}

/// GET `url` and block until the raw body is available.
#[unsafe(no_mangle)]
pub extern "C" fn xnet_load_bytes_blocking(
    client: *const FfiClient,
    url: *const c_char,
) -> *mut FfiOutcome {
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() {
            return FfiOutcome::null_arg("client");
        }
        if url.is_null() {
            return FfiOutcome::null_arg("url");
        }
        let client = unsafe { &*client };
        let url = unsafe { lossy_string(url) };
        let outcome = client.runtime.block_on(client.executor.load_bytes(url));
        FfiOutcome::from_bytes(outcome)
    }))
    .unwrap_or_else(|_| FfiOutcome::panic("panic in xnet_load_bytes_blocking"))
}

// ---------------------------------------------------------------------------
// Callback functions
// ---------------------------------------------------------------------------

/// Submit one JSON request; `callback` fires exactly once on a runtime
/// thread with the outcome and `user_data`, even if the client is freed
/// before the response arrives.
///
/// Returns `XNET_SUBMITTED`, or a negative code if the call was not
/// submitted, in which case the callback never fires. The request struct is
/// copied before returning and may be released immediately.
#[unsafe(no_mangle)]
pub extern "C" fn xnet_request(
    client: *const FfiClient,
    request: *const FfiRequest,
    callback: Option<FfiCallback>,
    user_data: *mut c_void,
) -> i32 {
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() || request.is_null() {
            return XNET_ERR_NULL_ARG;
        }
        let Some(callback) = callback else {
            return XNET_ERR_NULL_ARG;
        };
        let client = unsafe { &*client };
        let req = unsafe { &*request };
        if req.url.is_null() {
            return XNET_ERR_NULL_ARG;
        }
        let core_req = unsafe { ffi_request_to_core(req) };
        let executor = client.executor.clone();
        let completion = Completion::new(callback, user_data);
        client.runtime.spawn(async move {
            let outcome = executor.execute::<Value>(core_req).await;
            completion.deliver(FfiOutcome::from_json(outcome));
        });
        XNET_SUBMITTED
    }))
    .unwrap_or(XNET_ERR_PANIC)
}

/// Submit a raw byte load of `url`; `callback` fires exactly once.
///
/// Same return codes as `xnet_request`.
#[unsafe(no_mangle)]
pub extern "C" fn xnet_load_bytes(
    client: *const FfiClient,
    url: *const c_char,
    callback: Option<FfiCallback>,
    user_data: *mut c_void,
) -> i32 {
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() || url.is_null() {
            return XNET_ERR_NULL_ARG;
        }
        let Some(callback) = callback else {
            return XNET_ERR_NULL_ARG;
        };
        let client = unsafe { &*client };
        let url = unsafe { lossy_string(url) };
        let executor = client.executor.clone();
        let completion = Completion::new(callback, user_data);
        client.runtime.spawn(async move {
            let outcome = executor.load_bytes(url).await;
            completion.deliver(FfiOutcome::from_bytes(outcome));
        });
        XNET_SUBMITTED
    }))
    .unwrap_or(XNET_ERR_PANIC)
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free an `FfiOutcome` returned by any request/load function or handed to a
/// callback. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn xnet_outcome_free(outcome: *mut FfiOutcome) {
    if outcome.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let outcome = unsafe { Box::from_raw(outcome) };
        if !outcome.error_message.is_null() {
            drop(unsafe { CString::from_raw(outcome.error_message) });
        }
        if !outcome.data.is_null() {
            let slice = std::ptr::slice_from_raw_parts_mut(outcome.data, outcome.data_len);
            drop(unsafe { Box::from_raw(slice) });
        }
    });
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
