//! Test-only log capture.
//!
//! Installs a process-wide logger that records messages per thread, so
//! parallel tests only ever see their own output.

use std::cell::RefCell;

thread_local! {
    static CAPTURED: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
}

struct Capture;

impl log::Log for Capture {
    fn enabled(&self, _: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        CAPTURED.with(|lines| lines.borrow_mut().push(record.args().to_string()));
    }

    fn flush(&self) {}
}

static CAPTURE: Capture = Capture;

/// Run `f` and return every message it logged on this thread.
pub(crate) fn logs_during<R>(f: impl FnOnce() -> R) -> (R, Vec<String>) {
    let _ = log::set_logger(&CAPTURE);
    log::set_max_level(log::LevelFilter::Trace);
    CAPTURED.with(|lines| lines.borrow_mut().clear());
    let result = f();
    (result, CAPTURED.with(|lines| lines.take()))
}
