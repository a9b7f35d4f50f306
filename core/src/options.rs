//! Per-call and per-transport configuration.

use std::time::Duration;

/// Options that travel with a single call.
///
/// `priority` is a hint in `[0, 1]` for transports that can prioritize work;
/// `verbose` makes the pipeline log every response body it sees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RequestOptions {
    priority: f32,
    verbose: bool,
}

impl RequestOptions {
    pub const LOW_PRIORITY: f32 = 0.0;
    pub const DEFAULT_PRIORITY: f32 = 0.5;
    pub const HIGH_PRIORITY: f32 = 1.0;

    /// Values at or below zero become `LOW_PRIORITY`, values above one become
    /// `HIGH_PRIORITY`, and NaN falls back to `DEFAULT_PRIORITY`.
    pub fn new(priority: f32, verbose: bool) -> Self {
        Self {
            priority: clamp_priority(priority),
            verbose,
        }
    }

    pub fn with_priority(mut self, priority: f32) -> Self {
        self.priority = clamp_priority(priority);
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn priority(&self) -> f32 {
        self.priority
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            priority: Self::DEFAULT_PRIORITY,
            verbose: false,
        }
    }
}

pub fn clamp_priority(priority: f32) -> f32 {
    if priority.is_nan() {
        RequestOptions::DEFAULT_PRIORITY
    } else if priority <= 0.0 {
        RequestOptions::LOW_PRIORITY
    } else if priority > 1.0 {
        RequestOptions::HIGH_PRIORITY
    } else {
        priority
    }
}

/// Settings for the default ureq-backed transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    /// Upper bound on the whole exchange. `None` waits indefinitely.
    pub timeout: Option<Duration>,
    /// Largest response body that will be buffered.
    pub max_body_bytes: u64,
}

impl TransportConfig {
    pub const DEFAULT_MAX_BODY_BYTES: u64 = 10 * 1024 * 1024;

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_max_body_bytes(mut self, max_body_bytes: u64) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: None,
            max_body_bytes: Self::DEFAULT_MAX_BODY_BYTES,
        }
    }
}
